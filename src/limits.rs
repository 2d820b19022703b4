//! Limits applied to lexical values
//!
//! Validation work is linear in the size of the literal, so the only
//! protection needed is a cap on how much input a single call accepts.

use crate::error::{ValueError, ValueResult};

/// Limits configuration for value validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum size of a raw literal in bytes
    pub max_value_length: usize,

    /// Maximum number of whitespace-separated tokens in a bits value
    pub max_bit_tokens: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_value_length: 1024 * 1024, // 1 MiB
            max_bit_tokens: 1024,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_value_length: 64 * 1024, // 64 KiB
            max_bit_tokens: 64,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_value_length: 64 * 1024 * 1024, // 64 MiB
            max_bit_tokens: 65536,
        }
    }

    /// Check if a literal is within the size limit
    pub fn check_value_length(&self, text: &str) -> ValueResult<()> {
        if text.len() > self.max_value_length {
            Err(ValueError::ValueTooLong {
                length: text.len(),
                max: self.max_value_length,
            })
        } else {
            Ok(())
        }
    }

    /// Check if the number of bits tokens is within the limit
    pub fn check_bit_tokens(&self, count: usize) -> ValueResult<()> {
        if count > self.max_bit_tokens {
            Err(ValueError::TooManyBits {
                count,
                max: self.max_bit_tokens,
            })
        } else {
            Ok(())
        }
    }
}
