//! Base64 decoder for the binary type
//!
//! Whitespace anywhere in the literal is insignificant for decoding. The
//! canonical text keeps the literal as written, minus surrounding
//! whitespace, so folded lines survive.

use crate::error::{ValueError, ValueResult};
use crate::validators::facets::{check_length, RangeSet};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

/// Built-in name of the binary type
pub const BINARY: &str = "binary";

/// Standard alphabet, tolerating non-zero bits in the last symbol
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// A decoded binary value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryValue {
    /// Decoded bytes
    pub bytes: Vec<u8>,
    /// Canonical text
    pub canonical: String,
}

fn is_base64_symbol(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '+' || ch == '/'
}

/// Check alphabet and padding of the significant characters
fn check_alphabet(text: &str, significant: &[char]) -> ValueResult<()> {
    let len = significant.len();
    for (idx, &ch) in significant.iter().enumerate() {
        if is_base64_symbol(ch) {
            continue;
        }
        // padding is only valid as one or two trailing characters
        let padding_ok =
            ch == '=' && idx + 2 >= len && significant[idx + 1..].iter().all(|&c| c == '=');
        if !padding_ok {
            return Err(ValueError::InvalidBase64Char {
                text: text.to_string(),
                ch,
            });
        }
    }
    Ok(())
}

/// Apply the length restriction; a single fixed length is named in the message
fn check_byte_length(length: u64, constraint: Option<&RangeSet<u64>>) -> ValueResult<()> {
    match constraint {
        Some(range) if range.error_message().is_none() => match range.exact_value() {
            Some(required) if required != length => Err(ValueError::LengthViolation {
                length,
                error_message: Some(format!(
                    "This base64 value must be of length {}.",
                    required
                )),
            }),
            _ => range.check_length(length),
        },
        _ => check_length(length, constraint),
    }
}

/// Validate and decode a base64 literal, then apply the byte-length restriction
pub fn decode_binary(text: &str, length: Option<&RangeSet<u64>>) -> ValueResult<BinaryValue> {
    let text = text.trim();
    let significant: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = if significant.is_empty() {
        Vec::new()
    } else {
        if significant.len() % 4 != 0 {
            return Err(ValueError::Base64Length {
                text: text.to_string(),
            });
        }
        check_alphabet(text, &significant)?;

        let compact: String = significant.iter().collect();
        ENGINE
            .decode(compact.as_bytes())
            .map_err(|_| ValueError::InvalidValue {
                type_name: BINARY,
                text: text.to_string(),
            })?
    };

    check_byte_length(bytes.len() as u64, length)?;

    Ok(BinaryValue {
        bytes,
        canonical: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_folded_lines() {
        let value = decode_binary("\n   aGVs\nbG8=  \t\n  ", None).unwrap();
        assert_eq!(value.bytes, b"hello");
        assert_eq!(value.canonical, "aGVs\nbG8=");
    }

    #[test]
    fn test_empty_value() {
        let value = decode_binary("", None).unwrap();
        assert!(value.bytes.is_empty());
        assert_eq!(value.canonical, "");

        let value = decode_binary("  \n\t ", None).unwrap();
        assert!(value.bytes.is_empty());
        assert_eq!(value.canonical, "");
    }

    #[test]
    fn test_length_not_multiple_of_four() {
        assert_eq!(
            decode_binary("aGVsbG8", None),
            Err(ValueError::Base64Length {
                text: "aGVsbG8".to_string()
            })
        );
        assert!(matches!(
            decode_binary("VsbG8=", None),
            Err(ValueError::Base64Length { .. })
        ));
        // length is checked before the alphabet
        assert!(matches!(
            decode_binary("a@bcd=", None),
            Err(ValueError::Base64Length { .. })
        ));
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(
            decode_binary("aGV@", None),
            Err(ValueError::InvalidBase64Char {
                text: "aGV@".to_string(),
                ch: '@'
            })
        );
        assert_eq!(
            decode_binary("aG=s", None),
            Err(ValueError::InvalidBase64Char {
                text: "aG=s".to_string(),
                ch: '='
            })
        );
        assert!(matches!(
            decode_binary("a===", None),
            Err(ValueError::InvalidBase64Char { ch: '=', .. })
        ));
    }

    #[test]
    fn test_padding() {
        assert_eq!(decode_binary("TQ==", None).unwrap().bytes, b"M");
        assert_eq!(decode_binary("TWE=", None).unwrap().bytes, b"Ma");
        assert_eq!(decode_binary("TWFu", None).unwrap().bytes, b"Man");
    }

    #[test]
    fn test_length_restriction() {
        let exact = RangeSet::exact(5).with_error_message("This base64 value must be of length 5.");
        assert_eq!(
            decode_binary("TQ==", Some(&exact)),
            Err(ValueError::LengthViolation {
                length: 1,
                error_message: Some("This base64 value must be of length 5.".to_string())
            })
        );
        assert!(decode_binary("aGVsbG8=", Some(&exact)).is_ok());

        // a fixed length without a custom message still names the length
        assert_eq!(
            decode_binary("TQ==", Some(&RangeSet::exact(2))),
            Err(ValueError::LengthViolation {
                length: 1,
                error_message: Some("This base64 value must be of length 2.".to_string())
            })
        );
        assert!(decode_binary("TWE=", Some(&RangeSet::exact(2))).is_ok());

        let range = RangeSet::single(2, 3).unwrap();
        assert_eq!(
            decode_binary("", Some(&range)),
            Err(ValueError::LengthViolation {
                length: 0,
                error_message: None
            })
        );
    }
}
