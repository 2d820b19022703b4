//! Enumeration and bits members
//!
//! Members are matched by exact name, so a literal with surrounding
//! whitespace never names an enum. Bits values are whitespace separated
//! token lists whose canonical form orders the bits by position.

use crate::error::{Error, MemberKind, Result, ValueError, ValueResult};
use crate::limits::Limits;
use crate::names::validate_identifier;
use crate::validators::features::{FeatureExpr, FeatureState};
use indexmap::IndexMap;
use std::collections::HashSet;

/// A bit of a bits type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitDef {
    /// Bit name
    pub name: String,
    /// Bit position, the canonical ordering key
    pub position: u32,
    /// if-feature conditions, all of which must hold
    pub if_features: Vec<FeatureExpr>,
}

impl BitDef {
    /// Create an unconditional bit
    pub fn new(name: impl Into<String>, position: u32) -> Self {
        Self {
            name: name.into(),
            position,
            if_features: Vec::new(),
        }
    }

    /// Add an if-feature condition
    pub fn with_if_feature(mut self, expr: FeatureExpr) -> Self {
        self.if_features.push(expr);
        self
    }
}

/// An enum of an enumeration type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    /// Enum name
    pub name: String,
    /// Assigned integer value
    pub value: i32,
    /// if-feature conditions, all of which must hold
    pub if_features: Vec<FeatureExpr>,
}

impl EnumDef {
    /// Create an unconditional enum
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
            if_features: Vec::new(),
        }
    }

    /// Add an if-feature condition
    pub fn with_if_feature(mut self, expr: FeatureExpr) -> Self {
        self.if_features.push(expr);
        self
    }
}

/// Report the first failing if-feature condition, 1-based
fn check_enabled(
    kind: MemberKind,
    name: &str,
    if_features: &[FeatureExpr],
    state: &dyn FeatureState,
) -> ValueResult<()> {
    match if_features.iter().position(|expr| !expr.eval(state)) {
        Some(idx) => Err(ValueError::DisabledByFeature {
            kind,
            name: name.to_string(),
            condition: idx + 1,
        }),
        None => Ok(()),
    }
}

/// Ordered bits of a bits type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitDefs {
    bits: IndexMap<String, BitDef>,
}

impl BitDefs {
    /// Create an empty set of bits
    pub fn new() -> Self {
        Self::default()
    }

    /// Bits with positions assigned in declaration order from 0
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut defs = Self::new();
        for name in names {
            defs.push(name)?;
        }
        Ok(defs)
    }

    /// Add a bit, rejecting duplicate names and positions
    pub fn add(&mut self, bit: BitDef) -> Result<()> {
        validate_identifier(&bit.name)?;
        if self.bits.contains_key(&bit.name) {
            return Err(Error::Type(format!("Duplicate bit name \"{}\".", bit.name)));
        }
        if let Some(other) = self.bits.values().find(|b| b.position == bit.position) {
            return Err(Error::Type(format!(
                "Bit \"{}\" has the same position {} as bit \"{}\".",
                bit.name, bit.position, other.name
            )));
        }
        self.bits.insert(bit.name.clone(), bit);
        Ok(())
    }

    /// Add a bit at the position following the highest one so far
    pub fn push(&mut self, name: impl Into<String>) -> Result<()> {
        let position = match self.bits.values().map(|b| b.position).max() {
            Some(u32::MAX) => {
                return Err(Error::Type("Bit position overflow.".to_string()));
            }
            Some(highest) => highest + 1,
            None => 0,
        };
        self.add(BitDef::new(name, position))
    }

    /// Look up a bit by name
    pub fn get(&self, name: &str) -> Option<&BitDef> {
        self.bits.get(name)
    }

    /// Bits in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &BitDef> {
        self.bits.values()
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether there are no bits
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Resolve a bits literal into its bits ordered by position
    pub fn resolve(
        &self,
        text: &str,
        state: &dyn FeatureState,
        limits: &Limits,
    ) -> ValueResult<Vec<&BitDef>> {
        limits.check_bit_tokens(text.split_whitespace().count())?;

        let mut seen = HashSet::new();
        let mut matched = Vec::new();
        for token in text.split_whitespace() {
            let bit = self.get(token).ok_or_else(|| ValueError::UnknownBitValue {
                token: token.to_string(),
            })?;
            check_enabled(MemberKind::Bit, &bit.name, &bit.if_features, state)?;
            if !seen.insert(token) {
                return Err(ValueError::DuplicateBit {
                    token: token.to_string(),
                });
            }
            matched.push(bit);
        }

        matched.sort_by_key(|bit| bit.position);
        Ok(matched)
    }
}

/// Canonical text of resolved bits
pub fn bits_canonical(bits: &[&BitDef]) -> String {
    bits.iter()
        .map(|bit| bit.name.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ordered enums of an enumeration type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumDefs {
    enums: IndexMap<String, EnumDef>,
}

impl EnumDefs {
    /// Create an empty set of enums
    pub fn new() -> Self {
        Self::default()
    }

    /// Enums with values assigned in declaration order from 0
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut defs = Self::new();
        for name in names {
            defs.push(name)?;
        }
        Ok(defs)
    }

    /// Add an enum, rejecting duplicate names and values
    pub fn add(&mut self, def: EnumDef) -> Result<()> {
        validate_identifier(&def.name)?;
        if self.enums.contains_key(&def.name) {
            return Err(Error::Type(format!("Duplicate enum name \"{}\".", def.name)));
        }
        if let Some(other) = self.enums.values().find(|e| e.value == def.value) {
            return Err(Error::Type(format!(
                "Enum \"{}\" has the same value {} as enum \"{}\".",
                def.name, def.value, other.name
            )));
        }
        self.enums.insert(def.name.clone(), def);
        Ok(())
    }

    /// Add an enum with the value following the highest one so far
    pub fn push(&mut self, name: impl Into<String>) -> Result<()> {
        let value = match self.enums.values().map(|e| e.value).max() {
            Some(i32::MAX) => {
                return Err(Error::Type("Enum value overflow.".to_string()));
            }
            Some(highest) => highest + 1,
            None => 0,
        };
        self.add(EnumDef::new(name, value))
    }

    /// Look up an enum by name
    pub fn get(&self, name: &str) -> Option<&EnumDef> {
        self.enums.get(name)
    }

    /// Enums in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &EnumDef> {
        self.enums.values()
    }

    /// Number of enums
    pub fn len(&self) -> usize {
        self.enums.len()
    }

    /// Whether there are no enums
    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }

    /// Resolve an enumeration literal
    pub fn resolve(&self, text: &str, state: &dyn FeatureState) -> ValueResult<&EnumDef> {
        let def = self.get(text).ok_or_else(|| ValueError::UnknownEnumValue {
            text: text.to_string(),
        })?;
        check_enabled(MemberKind::Enumeration, &def.name, &def.if_features, state)?;
        Ok(def)
    }
}
