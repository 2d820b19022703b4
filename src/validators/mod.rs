//! YANG type validators
//!
//! This module contains the value-space logic of the built-in YANG types.

// Restrictions and lexers
pub mod binary;
pub mod facets;
pub mod numbers;

// Members and identities
pub mod enums;
pub mod features;
pub mod identities;

// Types and dispatch
pub mod builtins;
pub mod validation;

// Re-exports
pub use binary::{decode_binary, BinaryValue};
pub use builtins::{CanonicalValue, TypeDefinition, VariantValue};
pub use enums::{BitDef, BitDefs, EnumDef, EnumDefs};
pub use facets::{Interval, PatternRestriction, RangeSet};
pub use features::{FeatureExpr, FeatureRef, FeatureSet, FeatureState};
pub use identities::{Identity, IdentityId, IdentityRegistry, IdentityValue, ModuleId, ModuleInfo};
pub use numbers::{parse_decimal64, parse_int, parse_uint, Decimal64, IntWidth};
pub use validation::{validate_value, NoFeatures, ValidationContext};
