//! Namespace prefix handling
//!
//! A [`NamespacePrefixMap`] tells which module a prefix stands for at the
//! point a value was parsed. Building it (namespace declarations, scoping,
//! inheritance) is the document parser's job; here it is only consulted.

use crate::error::{Error, Result};
use crate::names::is_valid_identifier;
use std::collections::HashMap;

/// Mapping from prefixes to module names, plus the default module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespacePrefixMap {
    /// Mapping from prefix to module name
    prefixes: HashMap<String, String>,
    /// Module of unprefixed names
    default_module: Option<String>,
}

impl NamespacePrefixMap {
    /// Create a new empty prefix map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a prefix map whose unprefixed names belong to `module`
    pub fn with_default_module(module: impl Into<String>) -> Self {
        Self {
            prefixes: HashMap::new(),
            default_module: Some(module.into()),
        }
    }

    /// Add a prefix mapping, replacing any previous binding of the prefix
    pub fn add_prefix(&mut self, prefix: impl Into<String>, module: impl Into<String>) -> Result<()> {
        let prefix = prefix.into();
        if !is_valid_identifier(&prefix) {
            return Err(Error::Namespace(format!("Invalid prefix: '{}'", prefix)));
        }
        self.prefixes.insert(prefix, module.into());
        Ok(())
    }

    /// Builder form of [`add_prefix`](Self::add_prefix)
    pub fn with_prefix(mut self, prefix: impl Into<String>, module: impl Into<String>) -> Result<Self> {
        self.add_prefix(prefix, module)?;
        Ok(self)
    }

    /// Set the default module
    pub fn set_default_module(&mut self, module: impl Into<String>) {
        self.default_module = Some(module.into());
    }

    /// Get the module bound to a prefix
    pub fn get_module(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default module
    pub fn default_module(&self) -> Option<&str> {
        self.default_module.as_deref()
    }

    /// Resolve an optional prefix: `None` stands for the default module
    pub fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        match prefix {
            Some(prefix) => self.get_module(prefix),
            None => self.default_module(),
        }
    }

    /// Number of prefix bindings
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether there are no prefix bindings
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}
