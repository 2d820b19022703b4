//! Value validation entry point
//!
//! [`validate_value`] dispatches a lexical value to the validator of its type
//! kind and returns the canonical text together with the decoded value. The
//! schema-side state a value may depend on (prefix bindings, feature status,
//! identities, limits) is borrowed from a [`ValidationContext`] for the
//! duration of one call.

use crate::error::{ValueError, ValueResult};
use crate::limits::Limits;
use crate::namespaces::NamespacePrefixMap;
use crate::validators::binary::decode_binary;
use crate::validators::builtins::{CanonicalValue, TypeDefinition, VariantValue};
use crate::validators::enums::bits_canonical;
use crate::validators::facets::{check_length, check_patterns, check_range, PatternRestriction, RangeSet};
use crate::validators::features::{FeatureRef, FeatureState};
use crate::validators::identities::IdentityRegistry;
use crate::validators::numbers::{parse_decimal64, parse_int, parse_uint};
use once_cell::sync::Lazy;
use std::fmt;
use tracing::{debug, trace};

static NO_PREFIXES: Lazy<NamespacePrefixMap> = Lazy::new(NamespacePrefixMap::new);
static NO_IDENTITIES: Lazy<IdentityRegistry> = Lazy::new(IdentityRegistry::new);

/// Feature state in which every feature is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeatures;

impl FeatureState for NoFeatures {
    fn is_enabled(&self, _feature: &FeatureRef) -> bool {
        false
    }
}

static NO_FEATURES: NoFeatures = NoFeatures;

/// Schema-side state consulted while validating values
///
/// By default no prefix is bound, every feature is disabled and no identity
/// exists.
#[derive(Clone)]
pub struct ValidationContext<'a> {
    /// Prefix bindings in effect where the value occurs
    pub prefixes: &'a NamespacePrefixMap,
    /// Feature status snapshot
    pub features: &'a dyn FeatureState,
    /// Identities known to the schema
    pub identities: &'a IdentityRegistry,
    /// Input limits
    pub limits: Limits,
}

impl Default for ValidationContext<'_> {
    fn default() -> Self {
        Self {
            prefixes: &NO_PREFIXES,
            features: &NO_FEATURES,
            identities: &NO_IDENTITIES,
            limits: Limits::default(),
        }
    }
}

impl<'a> ValidationContext<'a> {
    /// Create a context with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prefix bindings
    pub fn with_prefixes(mut self, prefixes: &'a NamespacePrefixMap) -> Self {
        self.prefixes = prefixes;
        self
    }

    /// Set the feature snapshot
    pub fn with_features(mut self, features: &'a dyn FeatureState) -> Self {
        self.features = features;
        self
    }

    /// Set the identity registry
    pub fn with_identities(mut self, identities: &'a IdentityRegistry) -> Self {
        self.identities = identities;
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

impl fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("prefixes", self.prefixes)
            .field("identities", &self.identities.len())
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl TypeDefinition {
    /// Validate a lexical value of this type
    pub fn validate(&self, text: &str, ctx: &ValidationContext<'_>) -> ValueResult<CanonicalValue> {
        validate_value(self, text, ctx)
    }
}

/// Validate a lexical value against its type
pub fn validate_value(
    ty: &TypeDefinition,
    text: &str,
    ctx: &ValidationContext<'_>,
) -> ValueResult<CanonicalValue> {
    let result = ctx
        .limits
        .check_value_length(text)
        .and_then(|()| dispatch(ty, text, ctx));

    match &result {
        Ok(value) => trace!(
            type_name = ty.type_name(),
            canonical = %value.canonical_text,
            "accepted value"
        ),
        Err(err) => debug!(
            type_name = ty.type_name(),
            category = %err.category(),
            error = %err,
            "rejected value"
        ),
    }
    result
}

fn dispatch(
    ty: &TypeDefinition,
    text: &str,
    ctx: &ValidationContext<'_>,
) -> ValueResult<CanonicalValue> {
    match ty {
        TypeDefinition::Int { width, range } => {
            let value = parse_int(text, *width)?;
            check_range(value, range.as_ref(), || value.to_string())?;
            Ok(CanonicalValue::new(value.to_string(), VariantValue::Int(value)))
        }
        TypeDefinition::UInt { width, range } => {
            let value = parse_uint(text, *width)?;
            check_range(value, range.as_ref(), || value.to_string())?;
            Ok(CanonicalValue::new(value.to_string(), VariantValue::UInt(value)))
        }
        TypeDefinition::Decimal64 {
            fraction_digits,
            range,
        } => {
            let value = parse_decimal64(text, *fraction_digits)?;
            check_range(value.value(), range.as_ref(), || value.canonical())?;
            Ok(CanonicalValue::new(value.canonical(), VariantValue::Decimal64(value)))
        }
        TypeDefinition::String { length, patterns } => {
            validate_string(text, length.as_ref(), patterns)
        }
        TypeDefinition::Binary { length } => {
            let binary = decode_binary(text, length.as_ref())?;
            Ok(CanonicalValue::new(binary.canonical, VariantValue::Binary(binary.bytes)))
        }
        TypeDefinition::Boolean => match text {
            "true" => Ok(CanonicalValue::new("true", VariantValue::Boolean(true))),
            "false" => Ok(CanonicalValue::new("false", VariantValue::Boolean(false))),
            _ => Err(ValueError::InvalidBooleanValue {
                text: text.to_string(),
            }),
        },
        TypeDefinition::Empty => {
            if text.is_empty() {
                Ok(CanonicalValue::new("", VariantValue::Empty))
            } else {
                Err(ValueError::InvalidEmptyTypeValue {
                    text: text.to_string(),
                })
            }
        }
        TypeDefinition::Bits { defs } => {
            let bits = defs.resolve(text, ctx.features, &ctx.limits)?;
            let names = bits.iter().map(|bit| bit.name.clone()).collect();
            Ok(CanonicalValue::new(bits_canonical(&bits), VariantValue::Bits(names)))
        }
        TypeDefinition::Enumeration { defs } => {
            let def = defs.resolve(text, ctx.features)?;
            Ok(CanonicalValue::new(
                def.name.as_str(),
                VariantValue::Enumeration {
                    name: def.name.clone(),
                    value: def.value,
                },
            ))
        }
        TypeDefinition::Identityref { bases } => {
            let (identity, canonical) = ctx.identities.resolve(text, bases, ctx.prefixes)?;
            Ok(CanonicalValue::new(canonical, VariantValue::Identityref(identity)))
        }
    }
}

/// Length counts characters, not bytes
fn validate_string(
    text: &str,
    length: Option<&RangeSet<u64>>,
    patterns: &[PatternRestriction],
) -> ValueResult<CanonicalValue> {
    check_length(text.chars().count() as u64, length)?;
    check_patterns(text, patterns)?;
    Ok(CanonicalValue::new(text, VariantValue::String(text.to_string())))
}
