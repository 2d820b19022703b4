//! YANG identifier validation and prefixed names
//!
//! Identifiers name modules, features, identities, bits and enums. A
//! prefixed name is the `prefix:identifier` form used by identityref
//! values and if-feature expressions.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").unwrap());

/// Check if a string is a valid YANG identifier
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Validate an identifier and return an error if invalid
pub fn validate_identifier(name: &str) -> Result<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(Error::Name(format!("Invalid identifier: '{}'", name)))
    }
}

/// A name with an optional prefix, as written in a value or expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrefixedName<'a> {
    /// Prefix token, if any
    pub prefix: Option<&'a str>,
    /// Bare identifier
    pub name: &'a str,
}

impl<'a> PrefixedName<'a> {
    /// Split `prefix:name` or `name`, checking both parts are identifiers
    pub fn parse(text: &'a str) -> Option<Self> {
        let (prefix, name) = match text.split_once(':') {
            Some((prefix, name)) => (Some(prefix), name),
            None => (None, text),
        };

        if let Some(prefix) = prefix {
            if !is_valid_identifier(prefix) {
                return None;
            }
        }
        if !is_valid_identifier(name) {
            return None;
        }

        Some(Self { prefix, name })
    }
}

impl fmt::Display for PrefixedName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.name),
            None => f.write_str(self.name),
        }
    }
}
