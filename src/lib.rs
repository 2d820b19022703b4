//! # yangtypes
//!
//! Validation and canonicalization of YANG typed values.
//!
//! Given a compiled [`TypeDefinition`] and the raw text of a value, the
//! library decides whether the text is a legal instance of the type and, if
//! so, returns its canonical text and decoded machine value.
//!
//! ## Features
//!
//! - int8 to uint64 with range restrictions
//! - decimal64 as exact scaled integers
//! - string length and pattern restrictions
//! - base64 binary with byte-length restrictions
//! - bits and enumerations gated by if-feature expressions
//! - identityref resolution over multi-module identity graphs
//!
//! ## Example
//!
//! ```rust
//! use yangtypes::{TypeDefinition, ValidationContext};
//!
//! let ty = TypeDefinition::decimal64(1).unwrap().with_range("1.5..10").unwrap();
//! let value = ty.validate(" +8 ", &ValidationContext::new()).unwrap();
//! assert_eq!(value.canonical_text, "8.0");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Names and prefixes
pub mod names;
pub mod namespaces;

// Validators
pub mod validators;

// Re-exports for convenience
pub use error::{Error, ErrorCategory, MemberKind, Result, ValueError, ValueResult};
pub use limits::Limits;
pub use namespaces::NamespacePrefixMap;
pub use validators::{
    validate_value, BitDef, BitDefs, CanonicalValue, Decimal64, EnumDef, EnumDefs, FeatureExpr,
    FeatureRef, FeatureSet, FeatureState, IdentityId, IdentityRegistry, IntWidth, ModuleId,
    PatternRestriction, RangeSet, TypeDefinition, ValidationContext, VariantValue,
};

/// Version of the yangtypes library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
