//! Error types for yangtypes
//!
//! Two layers of errors live here:
//!
//! - [`ValueError`]: the closed set of reasons a single lexical value is
//!   rejected by its type. Every variant carries the offending literal so the
//!   caller can report it, optionally followed by its own node path.
//! - [`Error`]: failures while assembling schema-side objects (types, feature
//!   sets, identity registries) plus a wrapper for value errors.

use std::fmt;
use thiserror::Error;

/// Result type alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Result type returned by value validation entry points
pub type ValueResult<T> = std::result::Result<T, ValueError>;

/// Main error type for yangtypes operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A lexical value was rejected by its type
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Invalid type definition (restriction, fraction digits, members)
    #[error("type error: {0}")]
    Type(String),

    /// Feature declaration, expression or state error
    #[error("feature error: {0}")]
    Feature(String),

    /// Identity registry error
    #[error("identity error: {0}")]
    Identity(String),

    /// Namespace prefix error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Name error (invalid YANG identifier)
    #[error("name error: {0}")]
    Name(String),
}

/// Broad classification of value errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed numeric, base64, boolean or empty literal
    Lexical,
    /// Range, length or pattern restriction not satisfied
    ConstraintViolation,
    /// Enum or bit disabled by an unsatisfied if-feature condition
    FeatureGated,
    /// Unknown or duplicated bit/enum token
    StructuralBit,
    /// Identityref that cannot be resolved or is not accepted
    Identity,
}

impl ErrorCategory {
    /// Get the category as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Lexical => "lexical",
            ErrorCategory::ConstraintViolation => "constraint-violation",
            ErrorCategory::FeatureGated => "feature-gated",
            ErrorCategory::StructuralBit => "structural-bit",
            ErrorCategory::Identity => "identity",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a feature-gated type member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A bit of a bits type
    Bit,
    /// An enum of an enumeration type
    Enumeration,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Bit => f.write_str("Bit"),
            MemberKind::Enumeration => f.write_str("Enumeration"),
        }
    }
}

/// Rejection of a single lexical value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Nothing but whitespace where a number was expected
    #[error("Invalid empty {type_name} value.")]
    InvalidEmptyValue {
        /// Built-in type name
        type_name: &'static str,
    },

    /// Literal does not fit the native type (width overflow, sign on unsigned)
    #[error("Invalid {type_name} value \"{text}\".")]
    InvalidValue {
        /// Built-in type name
        type_name: &'static str,
        /// The literal
        text: String,
    },

    /// Literal contains an unexpected character
    #[error("Invalid {position}. character of {type_name} value \"{text}\".")]
    InvalidValueAt {
        /// Built-in type name
        type_name: &'static str,
        /// The literal
        text: String,
        /// 1-based character position of the first offending character
        position: usize,
    },

    /// Decimal literal with more fractional digits than the type allows
    #[error("Value \"{value}\" of decimal64 type exceeds defined number ({limit}) of fraction digits.")]
    FractionDigitsExceeded {
        /// The decimal literal
        value: String,
        /// Configured fraction digits
        limit: u8,
    },

    /// Numeric value outside of every interval of the range restriction
    #[error("{}", range_message(.value, .error_message))]
    RangeViolation {
        /// Canonical text of the value
        value: String,
        /// Custom error message of the restriction
        error_message: Option<String>,
    },

    /// String or binary length outside of the length restriction
    #[error("{}", length_message(.length, .error_message))]
    LengthViolation {
        /// Length in characters (string) or bytes (binary)
        length: u64,
        /// Custom error message of the restriction
        error_message: Option<String>,
    },

    /// String not conforming to one of its patterns
    #[error("{}", pattern_message(.text, .pattern_index, .error_message))]
    PatternMismatch {
        /// The string
        text: String,
        /// 1-based ordinal of the failing pattern
        pattern_index: usize,
        /// Custom error message of the pattern
        error_message: Option<String>,
    },

    /// Base64 body length is not a multiple of 4
    #[error("Base64 encoded value length must be divisible by 4.")]
    Base64Length {
        /// The literal
        text: String,
    },

    /// Character outside of the base64 alphabet
    #[error("Invalid Base64 character ({ch}).")]
    InvalidBase64Char {
        /// The literal
        text: String,
        /// Offending character
        ch: char,
    },

    /// Anything but `true` or `false`
    #[error("Invalid boolean value \"{text}\".")]
    InvalidBooleanValue {
        /// The literal
        text: String,
    },

    /// Non-empty value of the empty type
    #[error("Invalid empty value \"{text}\".")]
    InvalidEmptyTypeValue {
        /// The literal
        text: String,
    },

    /// Name not among the enums of the type
    #[error("Invalid enumeration value \"{text}\".")]
    UnknownEnumValue {
        /// The literal
        text: String,
    },

    /// Token not among the bits of the type
    #[error("Invalid bit value \"{token}\".")]
    UnknownBitValue {
        /// The offending token
        token: String,
    },

    /// Bit named more than once
    #[error("Bit \"{token}\" used multiple times.")]
    DuplicateBit {
        /// The repeated token
        token: String,
    },

    /// Bits value with more tokens than the configured limit
    #[error("Too many bits ({count}), at most {max} allowed.")]
    TooManyBits {
        /// Number of tokens in the literal
        count: usize,
        /// Configured limit
        max: usize,
    },

    /// Enum or bit whose if-feature condition is not satisfied
    #[error("{kind} \"{name}\" is disabled by its {condition}. if-feature condition.")]
    DisabledByFeature {
        /// Bit or enumeration
        kind: MemberKind,
        /// Member name
        name: String,
        /// 1-based ordinal of the first failing condition
        condition: usize,
    },

    /// Identityref literal that is not `[prefix:]identifier`
    #[error("Invalid identityref \"{text}\" value - not a valid identifier.")]
    MalformedIdentityref {
        /// The literal
        text: String,
    },

    /// Prefix (or missing default) that maps to no module
    #[error("Invalid identityref \"{text}\" value - unable to map prefix to YANG schema.")]
    UnresolvedPrefix {
        /// The literal
        text: String,
    },

    /// No identity with that name in the resolved module
    #[error("Invalid identityref \"{text}\" value - identity not found.")]
    UnknownIdentity {
        /// The literal
        text: String,
    },

    /// Identity defined in a module that is only imported
    #[error("Invalid identityref \"{text}\" value - identity found in non-implemented module \"{module}\".")]
    IdentityNotImplemented {
        /// The literal
        text: String,
        /// Name of the owning module
        module: String,
    },

    /// Identity not derived from the bases of the type
    #[error("Invalid identityref \"{text}\" value - identity not accepted by the type specification.")]
    IdentityNotAccepted {
        /// The literal
        text: String,
    },

    /// Literal larger than the configured limit
    #[error("Value of {length} bytes exceeds the maximum of {max} bytes.")]
    ValueTooLong {
        /// Literal length in bytes
        length: usize,
        /// Configured limit
        max: usize,
    },
}

fn range_message(value: &str, custom: &Option<String>) -> String {
    match custom {
        Some(message) => message.clone(),
        None => format!("Value \"{}\" does not satisfy the range constraint.", value),
    }
}

fn length_message(length: &u64, custom: &Option<String>) -> String {
    match custom {
        Some(message) => message.clone(),
        None => format!("Length \"{}\" does not satisfy the length constraint.", length),
    }
}

fn pattern_message(text: &str, index: &usize, custom: &Option<String>) -> String {
    match custom {
        Some(message) => message.clone(),
        None => format!(
            "String \"{}\" does not conform to the {}. pattern restriction of its type.",
            text, index
        ),
    }
}

impl ValueError {
    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            ValueError::InvalidEmptyValue { .. }
            | ValueError::InvalidValue { .. }
            | ValueError::InvalidValueAt { .. }
            | ValueError::FractionDigitsExceeded { .. }
            | ValueError::Base64Length { .. }
            | ValueError::InvalidBase64Char { .. }
            | ValueError::InvalidBooleanValue { .. }
            | ValueError::InvalidEmptyTypeValue { .. }
            | ValueError::ValueTooLong { .. } => ErrorCategory::Lexical,
            ValueError::RangeViolation { .. }
            | ValueError::LengthViolation { .. }
            | ValueError::PatternMismatch { .. } => ErrorCategory::ConstraintViolation,
            ValueError::DisabledByFeature { .. } => ErrorCategory::FeatureGated,
            ValueError::UnknownEnumValue { .. }
            | ValueError::UnknownBitValue { .. }
            | ValueError::DuplicateBit { .. }
            | ValueError::TooManyBits { .. } => ErrorCategory::StructuralBit,
            ValueError::MalformedIdentityref { .. }
            | ValueError::UnresolvedPrefix { .. }
            | ValueError::UnknownIdentity { .. }
            | ValueError::IdentityNotImplemented { .. }
            | ValueError::IdentityNotAccepted { .. } => ErrorCategory::Identity,
        }
    }

    /// The offending literal, token or value, if the error carries one
    pub fn text(&self) -> Option<&str> {
        match self {
            ValueError::InvalidValue { text, .. }
            | ValueError::InvalidValueAt { text, .. }
            | ValueError::PatternMismatch { text, .. }
            | ValueError::Base64Length { text }
            | ValueError::InvalidBase64Char { text, .. }
            | ValueError::InvalidBooleanValue { text }
            | ValueError::InvalidEmptyTypeValue { text }
            | ValueError::UnknownEnumValue { text }
            | ValueError::MalformedIdentityref { text }
            | ValueError::UnresolvedPrefix { text }
            | ValueError::UnknownIdentity { text }
            | ValueError::IdentityNotImplemented { text, .. }
            | ValueError::IdentityNotAccepted { text } => Some(text),
            ValueError::FractionDigitsExceeded { value, .. }
            | ValueError::RangeViolation { value, .. } => Some(value),
            ValueError::UnknownBitValue { token } | ValueError::DuplicateBit { token } => {
                Some(token)
            }
            ValueError::DisabledByFeature { name, .. } => Some(name),
            ValueError::InvalidEmptyValue { .. }
            | ValueError::LengthViolation { .. }
            | ValueError::TooManyBits { .. }
            | ValueError::ValueTooLong { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_message() {
        let err = ValueError::InvalidValueAt {
            type_name: "uint64",
            text: "10  xxx".to_string(),
            position: 5,
        };
        assert_eq!(
            err.to_string(),
            "Invalid 5. character of uint64 value \"10  xxx\"."
        );
        assert_eq!(err.category(), ErrorCategory::Lexical);
        assert_eq!(err.text(), Some("10  xxx"));
    }

    #[test]
    fn test_custom_message_replaces_default() {
        let err = ValueError::LengthViolation {
            length: 1,
            error_message: Some("This base64 value must be of length 5.".to_string()),
        };
        assert_eq!(err.to_string(), "This base64 value must be of length 5.");

        let err = ValueError::RangeViolation {
            value: "15.0".to_string(),
            error_message: None,
        };
        assert_eq!(
            err.to_string(),
            "Value \"15.0\" does not satisfy the range constraint."
        );
        assert_eq!(err.category(), ErrorCategory::ConstraintViolation);
    }

    #[test]
    fn test_feature_message() {
        let err = ValueError::DisabledByFeature {
            kind: MemberKind::Enumeration,
            name: "yellow".to_string(),
            condition: 1,
        };
        assert_eq!(
            err.to_string(),
            "Enumeration \"yellow\" is disabled by its 1. if-feature condition."
        );
        assert_eq!(err.category(), ErrorCategory::FeatureGated);
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ValueError::UnknownEnumValue {
            text: "black".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Value(_)));
        assert_eq!(
            err.to_string(),
            "value error: Invalid enumeration value \"black\"."
        );
    }
}
