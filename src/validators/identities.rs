//! YANG identities
//!
//! Identities live in an arena indexed by [`IdentityId`], each carrying the
//! ids of the identities it is directly derived from. The derivation graph
//! may contain diamonds, and cycles are only detected on request, so every
//! walk keeps a visited set.

use crate::error::{Error, Result, ValueError, ValueResult};
use crate::names::{validate_identifier, PrefixedName};
use crate::namespaces::NamespacePrefixMap;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::debug;

/// Index of a module in an [`IdentityRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModuleId(usize);

impl ModuleId {
    /// Arena index
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of an identity in an [`IdentityRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IdentityId(usize);

impl IdentityId {
    /// Arena index
    pub fn index(self) -> usize {
        self.0
    }
}

/// A module owning identities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module name
    pub name: String,
    /// Whether the module is implemented rather than only imported
    pub implemented: bool,
}

/// An identity and its direct bases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Identity name
    pub name: String,
    /// Owning module
    pub module: ModuleId,
    /// Identities this one is directly derived from
    pub bases: Vec<IdentityId>,
}

/// A resolved identityref value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityValue {
    /// Arena handle of the identity
    #[serde(skip)]
    pub id: IdentityId,
    /// Name of the owning module
    pub module: String,
    /// Identity name
    pub name: String,
}

/// Arena of modules and identities
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    modules: IndexMap<String, ModuleInfo>,
    identities: IndexMap<(ModuleId, String), Identity>,
}

impl IdentityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module
    pub fn add_module(&mut self, name: &str, implemented: bool) -> Result<ModuleId> {
        validate_identifier(name)?;
        if self.modules.contains_key(name) {
            return Err(Error::Identity(format!("Duplicate module \"{}\".", name)));
        }
        let (idx, _) = self.modules.insert_full(
            name.to_string(),
            ModuleInfo {
                name: name.to_string(),
                implemented,
            },
        );
        debug!(module = name, implemented, "registered module");
        Ok(ModuleId(idx))
    }

    /// Module by id
    pub fn module(&self, id: ModuleId) -> Option<&ModuleInfo> {
        self.modules.get_index(id.0).map(|(_, info)| info)
    }

    /// Module id by name
    pub fn find_module(&self, name: &str) -> Option<ModuleId> {
        self.modules.get_index_of(name).map(ModuleId)
    }

    /// Register an identity in a module
    pub fn add_identity(&mut self, module: ModuleId, name: &str) -> Result<IdentityId> {
        validate_identifier(name)?;
        let module_name = self
            .module(module)
            .map(|info| info.name.clone())
            .ok_or_else(|| Error::Identity(format!("Unknown module id {}.", module.0)))?;

        let key = (module, name.to_string());
        if self.identities.contains_key(&key) {
            return Err(Error::Identity(format!(
                "Duplicate identity \"{}\" in module \"{}\".",
                name, module_name
            )));
        }
        let (idx, _) = self.identities.insert_full(
            key,
            Identity {
                name: name.to_string(),
                module,
                bases: Vec::new(),
            },
        );
        debug!(module = %module_name, identity = name, "registered identity");
        Ok(IdentityId(idx))
    }

    /// Declare `base` as a direct base of `id`
    pub fn add_base(&mut self, id: IdentityId, base: IdentityId) -> Result<()> {
        if self.identity(base).is_none() {
            return Err(Error::Identity(format!("Unknown identity id {}.", base.0)));
        }
        let (_, identity) = self
            .identities
            .get_index_mut(id.0)
            .ok_or_else(|| Error::Identity(format!("Unknown identity id {}.", id.0)))?;
        if id == base {
            return Err(Error::Identity(format!(
                "Identity \"{}\" is derived from itself.",
                identity.name
            )));
        }
        if !identity.bases.contains(&base) {
            identity.bases.push(base);
        }
        debug!(identity = %identity.name, base = base.0, "added identity base");
        Ok(())
    }

    /// Identity by id
    pub fn identity(&self, id: IdentityId) -> Option<&Identity> {
        self.identities.get_index(id.0).map(|(_, identity)| identity)
    }

    /// Identity id by module name and identity name
    pub fn find_identity(&self, module: &str, name: &str) -> Option<IdentityId> {
        let module = self.find_module(module)?;
        self.identities
            .get_index_of(&(module, name.to_string()))
            .map(IdentityId)
    }

    /// Number of identities
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Whether no identity is registered
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    fn bases_of(&self, id: IdentityId) -> &[IdentityId] {
        self.identity(id)
            .map(|identity| identity.bases.as_slice())
            .unwrap_or(&[])
    }

    /// Identities directly derived from `id`, in registration order
    pub fn derived(&self, id: IdentityId) -> Vec<IdentityId> {
        self.identities
            .values()
            .enumerate()
            .filter(|(_, identity)| identity.bases.contains(&id))
            .map(|(idx, _)| IdentityId(idx))
            .collect()
    }

    /// Whether `id` is derived from `base`, directly or transitively
    ///
    /// An identity is not derived from itself.
    pub fn is_derived_from(&self, id: IdentityId, base: IdentityId) -> bool {
        let mut visited = vec![false; self.identities.len()];
        let mut queue: VecDeque<IdentityId> = self.bases_of(id).iter().copied().collect();

        while let Some(current) = queue.pop_front() {
            if current == base {
                return true;
            }
            match visited.get_mut(current.0) {
                Some(seen) if !*seen => *seen = true,
                _ => continue,
            }
            queue.extend(self.bases_of(current).iter().copied());
        }
        false
    }

    /// Whether `id` is derived from every one of `bases`
    pub fn derives_from_all(&self, id: IdentityId, bases: &[IdentityId]) -> bool {
        bases.iter().all(|&base| self.is_derived_from(id, base))
    }

    /// Fail on the first identity that is derived from itself
    pub fn check_cycles(&self) -> Result<()> {
        for (idx, identity) in self.identities.values().enumerate() {
            let id = IdentityId(idx);
            if self.is_derived_from(id, id) {
                return Err(Error::Identity(format!(
                    "Identity \"{}\" is indirectly derived from itself.",
                    identity.name
                )));
            }
        }
        Ok(())
    }

    /// Resolve an identityref literal against the bases of its type
    ///
    /// Returns the identity and the canonical text: the bare name when the
    /// identity belongs to the default module, otherwise the literal's own
    /// `prefix:name`.
    pub fn resolve(
        &self,
        text: &str,
        bases: &[IdentityId],
        prefixes: &NamespacePrefixMap,
    ) -> ValueResult<(IdentityValue, String)> {
        let text = text.trim();
        let name = PrefixedName::parse(text).ok_or_else(|| ValueError::MalformedIdentityref {
            text: text.to_string(),
        })?;

        let module_id = prefixes
            .resolve(name.prefix)
            .and_then(|module| self.find_module(module))
            .ok_or_else(|| ValueError::UnresolvedPrefix {
                text: text.to_string(),
            })?;
        let module = self
            .module(module_id)
            .ok_or_else(|| ValueError::UnresolvedPrefix {
                text: text.to_string(),
            })?;

        let id = self
            .identities
            .get_index_of(&(module_id, name.name.to_string()))
            .map(IdentityId)
            .ok_or_else(|| ValueError::UnknownIdentity {
                text: text.to_string(),
            })?;

        if !module.implemented {
            return Err(ValueError::IdentityNotImplemented {
                text: text.to_string(),
                module: module.name.clone(),
            });
        }
        if !self.derives_from_all(id, bases) {
            return Err(ValueError::IdentityNotAccepted {
                text: text.to_string(),
            });
        }

        let canonical = if prefixes.default_module() == Some(module.name.as_str()) {
            name.name.to_string()
        } else {
            name.to_string()
        };
        let value = IdentityValue {
            id,
            module: module.name.clone(),
            name: name.name.to_string(),
        };
        Ok((value, canonical))
    }
}
