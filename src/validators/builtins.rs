//! YANG built-in types
//!
//! This module defines the closed set of built-in type kinds, the restrictions
//! each kind admits, and the decoded values validation produces.

use crate::error::{Error, Result};
use crate::validators::enums::{BitDefs, EnumDefs};
use crate::validators::facets::{PatternRestriction, RangeSet};
use crate::validators::identities::{IdentityId, IdentityValue};
use crate::validators::numbers::{
    check_fraction_digits, parse_decimal64, parse_int, parse_uint, Decimal64, IntWidth, DECIMAL64,
};
use serde::Serialize;
use std::fmt;

// =============================================================================
// Type Name Constants
// =============================================================================

/// YANG int8 type name
pub const YANG_INT8: &str = "int8";
/// YANG int16 type name
pub const YANG_INT16: &str = "int16";
/// YANG int32 type name
pub const YANG_INT32: &str = "int32";
/// YANG int64 type name
pub const YANG_INT64: &str = "int64";
/// YANG uint8 type name
pub const YANG_UINT8: &str = "uint8";
/// YANG uint16 type name
pub const YANG_UINT16: &str = "uint16";
/// YANG uint32 type name
pub const YANG_UINT32: &str = "uint32";
/// YANG uint64 type name
pub const YANG_UINT64: &str = "uint64";
/// YANG decimal64 type name
pub const YANG_DECIMAL64: &str = DECIMAL64;
/// YANG string type name
pub const YANG_STRING: &str = "string";
/// YANG binary type name
pub const YANG_BINARY: &str = crate::validators::binary::BINARY;
/// YANG boolean type name
pub const YANG_BOOLEAN: &str = "boolean";
/// YANG empty type name
pub const YANG_EMPTY: &str = "empty";
/// YANG bits type name
pub const YANG_BITS: &str = "bits";
/// YANG enumeration type name
pub const YANG_ENUMERATION: &str = "enumeration";
/// YANG identityref type name
pub const YANG_IDENTITYREF: &str = "identityref";

// =============================================================================
// Type Definition
// =============================================================================

/// A compiled type: a built-in kind plus its restrictions
///
/// Decimal64 ranges are stored in scaled units of the type's fraction digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefinition {
    /// Signed integer
    Int {
        /// Native width
        width: IntWidth,
        /// Range restriction
        range: Option<RangeSet<i64>>,
    },
    /// Unsigned integer
    UInt {
        /// Native width
        width: IntWidth,
        /// Range restriction
        range: Option<RangeSet<u64>>,
    },
    /// Fixed-point decimal
    Decimal64 {
        /// Digits after the decimal point, 1..=18
        fraction_digits: u8,
        /// Range restriction in scaled units
        range: Option<RangeSet<i64>>,
    },
    /// Character string
    String {
        /// Length restriction in characters
        length: Option<RangeSet<u64>>,
        /// Pattern restrictions, all of which apply
        patterns: Vec<PatternRestriction>,
    },
    /// Base64 encoded bytes
    Binary {
        /// Length restriction in bytes
        length: Option<RangeSet<u64>>,
    },
    /// `true` or `false`
    Boolean,
    /// No value
    Empty,
    /// Set of named bits
    Bits {
        /// Declared bits
        defs: BitDefs,
    },
    /// One of a set of names
    Enumeration {
        /// Declared enums
        defs: EnumDefs,
    },
    /// Reference to an identity derived from every base
    Identityref {
        /// Required bases
        bases: Vec<IdentityId>,
    },
}

impl TypeDefinition {
    /// Signed integer of the given width
    pub fn int(width: IntWidth) -> Self {
        TypeDefinition::Int { width, range: None }
    }

    /// Unsigned integer of the given width
    pub fn uint(width: IntWidth) -> Self {
        TypeDefinition::UInt { width, range: None }
    }

    /// int8
    pub fn int8() -> Self {
        Self::int(IntWidth::W8)
    }

    /// int16
    pub fn int16() -> Self {
        Self::int(IntWidth::W16)
    }

    /// int32
    pub fn int32() -> Self {
        Self::int(IntWidth::W32)
    }

    /// int64
    pub fn int64() -> Self {
        Self::int(IntWidth::W64)
    }

    /// uint8
    pub fn uint8() -> Self {
        Self::uint(IntWidth::W8)
    }

    /// uint16
    pub fn uint16() -> Self {
        Self::uint(IntWidth::W16)
    }

    /// uint32
    pub fn uint32() -> Self {
        Self::uint(IntWidth::W32)
    }

    /// uint64
    pub fn uint64() -> Self {
        Self::uint(IntWidth::W64)
    }

    /// decimal64 with the given fraction digits
    pub fn decimal64(fraction_digits: u8) -> Result<Self> {
        check_fraction_digits(fraction_digits)?;
        Ok(TypeDefinition::Decimal64 {
            fraction_digits,
            range: None,
        })
    }

    /// Unrestricted string
    pub fn string() -> Self {
        TypeDefinition::String {
            length: None,
            patterns: Vec::new(),
        }
    }

    /// Unrestricted binary
    pub fn binary() -> Self {
        TypeDefinition::Binary { length: None }
    }

    /// bits with the given members
    pub fn bits(defs: BitDefs) -> Self {
        TypeDefinition::Bits { defs }
    }

    /// enumeration with the given members
    pub fn enumeration(defs: EnumDefs) -> Self {
        TypeDefinition::Enumeration { defs }
    }

    /// identityref accepting identities derived from all of `bases`
    pub fn identityref(bases: Vec<IdentityId>) -> Result<Self> {
        if bases.is_empty() {
            return Err(Error::Type("identityref requires at least one base".to_string()));
        }
        Ok(TypeDefinition::Identityref { bases })
    }

    /// Type of a built-in name that needs no further arguments
    pub fn from_builtin_name(name: &str) -> Option<Self> {
        let ty = match name {
            YANG_INT8 => Self::int8(),
            YANG_INT16 => Self::int16(),
            YANG_INT32 => Self::int32(),
            YANG_INT64 => Self::int64(),
            YANG_UINT8 => Self::uint8(),
            YANG_UINT16 => Self::uint16(),
            YANG_UINT32 => Self::uint32(),
            YANG_UINT64 => Self::uint64(),
            YANG_STRING => Self::string(),
            YANG_BINARY => Self::binary(),
            YANG_BOOLEAN => TypeDefinition::Boolean,
            YANG_EMPTY => TypeDefinition::Empty,
            _ => return None,
        };
        Some(ty)
    }

    /// Built-in type name
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeDefinition::Int { width, .. } => width.signed_name(),
            TypeDefinition::UInt { width, .. } => width.unsigned_name(),
            TypeDefinition::Decimal64 { .. } => YANG_DECIMAL64,
            TypeDefinition::String { .. } => YANG_STRING,
            TypeDefinition::Binary { .. } => YANG_BINARY,
            TypeDefinition::Boolean => YANG_BOOLEAN,
            TypeDefinition::Empty => YANG_EMPTY,
            TypeDefinition::Bits { .. } => YANG_BITS,
            TypeDefinition::Enumeration { .. } => YANG_ENUMERATION,
            TypeDefinition::Identityref { .. } => YANG_IDENTITYREF,
        }
    }

    /// Add a `range` restriction to a numeric type
    pub fn with_range(mut self, expr: &str) -> Result<Self> {
        let type_name = self.type_name();
        match &mut self {
            TypeDefinition::Int { width, range } => {
                let (min, max) = width.signed_bounds();
                let width = *width;
                *range = Some(RangeSet::parse(expr, min, max, |s| {
                    parse_int(s, width).ok()
                })?);
            }
            TypeDefinition::UInt { width, range } => {
                let width = *width;
                *range = Some(RangeSet::parse(expr, 0, width.unsigned_max(), |s| {
                    parse_uint(s, width).ok()
                })?);
            }
            TypeDefinition::Decimal64 {
                fraction_digits,
                range,
            } => {
                let fraction_digits = *fraction_digits;
                *range = Some(RangeSet::parse(expr, i64::MIN, i64::MAX, |s| {
                    parse_decimal64(s, fraction_digits).ok().map(|d| d.value())
                })?);
            }
            _ => return Err(not_applicable("range", type_name)),
        }
        Ok(self)
    }

    /// Add a `length` restriction to a string or binary type
    pub fn with_length(mut self, expr: &str) -> Result<Self> {
        let type_name = self.type_name();
        match &mut self {
            TypeDefinition::String { length, .. } | TypeDefinition::Binary { length } => {
                *length = Some(RangeSet::parse_length(expr)?);
            }
            _ => return Err(not_applicable("length", type_name)),
        }
        Ok(self)
    }

    /// Set the custom message of the range restriction
    pub fn with_range_message(mut self, message: &str) -> Result<Self> {
        let type_name = self.type_name();
        match &mut self {
            TypeDefinition::Int {
                range: Some(range), ..
            }
            | TypeDefinition::Decimal64 {
                range: Some(range), ..
            } => *range = range.clone().with_error_message(message),
            TypeDefinition::UInt {
                range: Some(range), ..
            } => *range = range.clone().with_error_message(message),
            _ => return Err(not_applicable("range error-message", type_name)),
        }
        Ok(self)
    }

    /// Set the custom message of the length restriction
    pub fn with_length_message(mut self, message: &str) -> Result<Self> {
        let type_name = self.type_name();
        match &mut self {
            TypeDefinition::String {
                length: Some(length),
                ..
            }
            | TypeDefinition::Binary {
                length: Some(length),
            } => *length = length.clone().with_error_message(message),
            _ => return Err(not_applicable("length error-message", type_name)),
        }
        Ok(self)
    }

    /// Add a pattern restriction to a string type
    pub fn with_pattern(self, pattern: &str) -> Result<Self> {
        self.with_pattern_restriction(PatternRestriction::new(pattern)?)
    }

    /// Add an inverted pattern restriction to a string type
    pub fn with_inverted_pattern(self, pattern: &str) -> Result<Self> {
        self.with_pattern_restriction(PatternRestriction::inverted(pattern)?)
    }

    /// Add a compiled pattern restriction to a string type
    pub fn with_pattern_restriction(mut self, restriction: PatternRestriction) -> Result<Self> {
        let type_name = self.type_name();
        match &mut self {
            TypeDefinition::String { patterns, .. } => patterns.push(restriction),
            _ => return Err(not_applicable("pattern", type_name)),
        }
        Ok(self)
    }
}

fn not_applicable(restriction: &str, type_name: &str) -> Error {
    Error::Type(format!(
        "{} restriction is not applicable to type {}",
        restriction, type_name
    ))
}

impl fmt::Display for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

// =============================================================================
// Decoded Values
// =============================================================================

/// Machine value of a validated literal, one variant per type kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum VariantValue {
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Scaled fixed-point value
    Decimal64(Decimal64),
    /// String
    String(String),
    /// Decoded bytes
    Binary(Vec<u8>),
    /// Boolean
    Boolean(bool),
    /// The empty value
    Empty,
    /// Bit names in position order
    Bits(Vec<String>),
    /// Matched enum
    Enumeration {
        /// Enum name
        name: String,
        /// Assigned value
        value: i32,
    },
    /// Resolved identity
    Identityref(IdentityValue),
}

/// Result of a successful validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalValue {
    /// Canonical text of the value
    pub canonical_text: String,
    /// Decoded value
    pub decoded: VariantValue,
}

impl CanonicalValue {
    /// Create a canonical value
    pub fn new(canonical_text: impl Into<String>, decoded: VariantValue) -> Self {
        Self {
            canonical_text: canonical_text.into(),
            decoded,
        }
    }
}

impl fmt::Display for CanonicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_text)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::numbers::parse_decimal64;

    #[test]
    fn test_builtin_names() {
        for name in [
            YANG_INT8,
            YANG_INT16,
            YANG_INT32,
            YANG_INT64,
            YANG_UINT8,
            YANG_UINT16,
            YANG_UINT32,
            YANG_UINT64,
            YANG_STRING,
            YANG_BINARY,
            YANG_BOOLEAN,
            YANG_EMPTY,
        ] {
            let ty = TypeDefinition::from_builtin_name(name).unwrap();
            assert_eq!(ty.type_name(), name);
        }
        assert!(TypeDefinition::from_builtin_name("decimal64").is_none());
        assert!(TypeDefinition::from_builtin_name("int128").is_none());
    }

    #[test]
    fn test_int_range() {
        let ty = TypeDefinition::int8().with_range("10..20").unwrap();
        match ty {
            TypeDefinition::Int {
                range: Some(range), ..
            } => {
                assert!(range.contains(15));
                assert!(!range.contains(9));
            }
            other => panic!("unexpected type {:?}", other),
        }

        assert!(TypeDefinition::int8().with_range("10..200").is_err());
        assert!(TypeDefinition::uint8().with_range("-1..5").is_err());
        assert!(TypeDefinition::int16().with_range("min..-10").is_ok());
    }

    #[test]
    fn test_decimal_range_is_scaled() {
        let ty = TypeDefinition::decimal64(1)
            .unwrap()
            .with_range("1.5..10")
            .unwrap();
        let TypeDefinition::Decimal64 {
            range: Some(range), ..
        } = ty
        else {
            panic!("expected a decimal64 range");
        };
        assert_eq!((range.intervals()[0].min, range.intervals()[0].max), (15, 100));
        assert!(range.contains(parse_decimal64("8.5", 1).unwrap().value()));

        assert!(TypeDefinition::decimal64(1)
            .unwrap()
            .with_range("1.55..10")
            .is_err());
        assert!(TypeDefinition::decimal64(0).is_err());
        assert!(TypeDefinition::decimal64(19).is_err());
    }

    #[test]
    fn test_restrictions_not_applicable() {
        assert!(TypeDefinition::Boolean.with_range("1..2").is_err());
        assert!(TypeDefinition::int8().with_length("1..2").is_err());
        assert!(TypeDefinition::binary().with_pattern("[a-z]*").is_err());
        assert!(TypeDefinition::string().with_range_message("no").is_err());
        assert!(TypeDefinition::string().with_length_message("no").is_err());
        assert!(TypeDefinition::identityref(Vec::new()).is_err());
    }

    #[test]
    fn test_string_restrictions() {
        let ty = TypeDefinition::string()
            .with_length("8..10")
            .unwrap()
            .with_pattern("[a-z ]*")
            .unwrap()
            .with_inverted_pattern("x.*")
            .unwrap();
        match &ty {
            TypeDefinition::String { length, patterns } => {
                assert_eq!(length.as_ref().map(|l| l.to_string()), Some("8..10".to_string()));
                assert_eq!(patterns.len(), 2);
                assert!(patterns[1].is_inverted());
            }
            other => panic!("unexpected type {:?}", other),
        }
        assert_eq!(ty.to_string(), "string");
    }

    #[test]
    fn test_custom_length_message() {
        let ty = TypeDefinition::binary()
            .with_length("5")
            .unwrap()
            .with_length_message("This base64 value must be of length 5.")
            .unwrap();
        match ty {
            TypeDefinition::Binary {
                length: Some(length),
            } => assert_eq!(
                length.error_message(),
                Some("This base64 value must be of length 5.")
            ),
            other => panic!("unexpected type {:?}", other),
        }
    }

    #[test]
    fn test_value_serialization() {
        let value = CanonicalValue::new("zero two", VariantValue::Bits(vec![
            "zero".to_string(),
            "two".to_string(),
        ]));
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "canonical_text": "zero two",
                "decoded": { "kind": "bits", "value": ["zero", "two"] }
            })
        );

        let json = serde_json::to_value(VariantValue::Empty).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "empty" }));
    }
}
