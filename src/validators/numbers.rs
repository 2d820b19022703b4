//! Integer and decimal64 lexers
//!
//! The grammar is the same for every width: an optional sign (signed types
//! only), one or more decimal digits without superfluous leading zeros and,
//! for decimal64, an optional fraction. Surrounding whitespace is not
//! significant. Diagnostics point at the first character the grammar does
//! not accept, counted in characters from 1 within the trimmed literal.

use crate::error::{Error, Result, ValueError, ValueResult};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Built-in name of the decimal64 type
pub const DECIMAL64: &str = "decimal64";

/// Highest number of fraction digits of a decimal64 type
pub const MAX_FRACTION_DIGITS: u8 = 18;

/// Width of an integer type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IntWidth {
    /// 8 bits
    W8,
    /// 16 bits
    W16,
    /// 32 bits
    W32,
    /// 64 bits
    W64,
}

impl IntWidth {
    /// Get the width from a number of bits
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(IntWidth::W8),
            16 => Some(IntWidth::W16),
            32 => Some(IntWidth::W32),
            64 => Some(IntWidth::W64),
            _ => None,
        }
    }

    /// Number of bits
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }

    /// Inclusive bounds of the signed type of this width
    pub fn signed_bounds(self) -> (i64, i64) {
        match self {
            IntWidth::W8 => (i8::MIN.into(), i8::MAX.into()),
            IntWidth::W16 => (i16::MIN.into(), i16::MAX.into()),
            IntWidth::W32 => (i32::MIN.into(), i32::MAX.into()),
            IntWidth::W64 => (i64::MIN, i64::MAX),
        }
    }

    /// Upper bound of the unsigned type of this width
    pub fn unsigned_max(self) -> u64 {
        match self {
            IntWidth::W8 => u8::MAX.into(),
            IntWidth::W16 => u16::MAX.into(),
            IntWidth::W32 => u32::MAX.into(),
            IntWidth::W64 => u64::MAX,
        }
    }

    /// Name of the signed type (`int8` ...)
    pub fn signed_name(self) -> &'static str {
        match self {
            IntWidth::W8 => "int8",
            IntWidth::W16 => "int16",
            IntWidth::W32 => "int32",
            IntWidth::W64 => "int64",
        }
    }

    /// Name of the unsigned type (`uint8` ...)
    pub fn unsigned_name(self) -> &'static str {
        match self {
            IntWidth::W8 => "uint8",
            IntWidth::W16 => "uint16",
            IntWidth::W32 => "uint32",
            IntWidth::W64 => "uint64",
        }
    }
}

impl fmt::Display for IntWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Lexically valid number split into its parts
struct NumberParts<'a> {
    negative: bool,
    integer: &'a str,
    fraction: Option<&'a str>,
}

/// 1-based character position of a byte offset
fn char_position(text: &str, byte_idx: usize) -> usize {
    text[..byte_idx].chars().count() + 1
}

fn invalid_at(type_name: &'static str, text: &str, byte_idx: usize) -> ValueError {
    ValueError::InvalidValueAt {
        type_name,
        text: text.to_string(),
        position: char_position(text, byte_idx),
    }
}

fn invalid(type_name: &'static str, text: &str) -> ValueError {
    ValueError::InvalidValue {
        type_name,
        text: text.to_string(),
    }
}

/// Run the number grammar over a trimmed, non-empty literal
fn scan_number<'a>(
    text: &'a str,
    type_name: &'static str,
    signed: bool,
    decimal: bool,
) -> ValueResult<NumberParts<'a>> {
    let bytes = text.as_bytes();
    let mut idx = 0;
    let mut negative = false;

    if let Some(&sign @ (b'+' | b'-')) = bytes.first() {
        if !signed {
            return Err(invalid(type_name, text));
        }
        negative = sign == b'-';
        idx = 1;
    }

    let int_start = idx;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == int_start {
        return Err(if idx < bytes.len() {
            invalid_at(type_name, text, idx)
        } else {
            invalid(type_name, text)
        });
    }
    if idx - int_start > 1 && bytes[int_start] == b'0' {
        return Err(invalid_at(type_name, text, int_start + 1));
    }
    let integer = &text[int_start..idx];

    let mut fraction = None;
    if decimal && idx < bytes.len() && bytes[idx] == b'.' {
        let dot = idx;
        idx += 1;
        let frac_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == frac_start {
            return Err(invalid_at(type_name, text, if idx < bytes.len() { idx } else { dot }));
        }
        fraction = Some(&text[frac_start..idx]);
    }

    if idx < bytes.len() {
        // point past whitespace separating the number from the garbage
        let garbage = text[idx..]
            .find(|c: char| !c.is_whitespace())
            .map_or(idx, |offset| idx + offset);
        return Err(invalid_at(type_name, text, garbage));
    }

    Ok(NumberParts {
        negative,
        integer,
        fraction,
    })
}

/// Accumulate decimal digits, `None` on overflow
fn accumulate(digits: &str, start: i128) -> Option<i128> {
    digits.bytes().try_fold(start, |acc, digit| {
        acc.checked_mul(10)?.checked_add(i128::from(digit - b'0'))
    })
}

/// Parse a signed integer literal of the given width
pub fn parse_int(text: &str, width: IntWidth) -> ValueResult<i64> {
    let type_name = width.signed_name();
    let text = text.trim();
    if text.is_empty() {
        return Err(ValueError::InvalidEmptyValue { type_name });
    }

    let parts = scan_number(text, type_name, true, false)?;
    let magnitude = accumulate(parts.integer, 0).ok_or_else(|| invalid(type_name, text))?;
    let value = if parts.negative { -magnitude } else { magnitude };

    let (min, max) = width.signed_bounds();
    if value < i128::from(min) || value > i128::from(max) {
        return Err(invalid(type_name, text));
    }
    Ok(value as i64)
}

/// Parse an unsigned integer literal of the given width
pub fn parse_uint(text: &str, width: IntWidth) -> ValueResult<u64> {
    let type_name = width.unsigned_name();
    let text = text.trim();
    if text.is_empty() {
        return Err(ValueError::InvalidEmptyValue { type_name });
    }

    let parts = scan_number(text, type_name, false, false)?;
    let value = accumulate(parts.integer, 0).ok_or_else(|| invalid(type_name, text))?;
    if value > i128::from(width.unsigned_max()) {
        return Err(invalid(type_name, text));
    }
    Ok(value as u64)
}

/// A decimal64 value: a scaled integer plus its fixed number of fraction digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Decimal64 {
    value: i64,
    fraction_digits: u8,
}

impl Decimal64 {
    /// Create a value from its scaled representation (`8.5` is `85` with 1 digit)
    pub fn new(value: i64, fraction_digits: u8) -> Result<Self> {
        check_fraction_digits(fraction_digits)?;
        Ok(Self {
            value,
            fraction_digits,
        })
    }

    /// The scaled integer
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Number of fraction digits of the type
    pub fn fraction_digits(&self) -> u8 {
        self.fraction_digits
    }

    /// Exact conversion to a [`Decimal`]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.value, u32::from(self.fraction_digits))
    }

    /// Canonical text: sign only when negative, at least one digit on both
    /// sides of the point, no trailing fractional zeros beyond the first
    pub fn canonical(&self) -> String {
        let scale = 10u64.pow(u32::from(self.fraction_digits));
        let magnitude = self.value.unsigned_abs();
        let fraction = format!(
            "{:0width$}",
            magnitude % scale,
            width = usize::from(self.fraction_digits)
        );
        let fraction = match fraction.trim_end_matches('0') {
            "" => "0",
            trimmed => trimmed,
        };
        format!(
            "{}{}.{}",
            if self.value < 0 { "-" } else { "" },
            magnitude / scale,
            fraction
        )
    }
}

impl fmt::Display for Decimal64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Check that fraction digits are within 1..=18
pub fn check_fraction_digits(fraction_digits: u8) -> Result<()> {
    if (1..=MAX_FRACTION_DIGITS).contains(&fraction_digits) {
        Ok(())
    } else {
        Err(Error::Type(format!(
            "Invalid fraction-digits {}: must be between 1 and {}",
            fraction_digits, MAX_FRACTION_DIGITS
        )))
    }
}

/// Parse a decimal64 literal for a type with the given fraction digits
///
/// The fraction digit limit is only checked once the whole literal is known
/// to be lexically valid.
pub fn parse_decimal64(text: &str, fraction_digits: u8) -> ValueResult<Decimal64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValueError::InvalidEmptyValue {
            type_name: DECIMAL64,
        });
    }

    let parts = scan_number(text, DECIMAL64, true, true)?;
    let fraction = parts.fraction.unwrap_or("");
    if fraction.len() > usize::from(fraction_digits) {
        return Err(ValueError::FractionDigitsExceeded {
            value: text.to_string(),
            limit: fraction_digits,
        });
    }

    let padding = u32::from(fraction_digits) - fraction.len() as u32;
    let magnitude = accumulate(parts.integer, 0)
        .and_then(|int| accumulate(fraction, int))
        .and_then(|scaled| scaled.checked_mul(10i128.pow(padding)))
        .ok_or_else(|| invalid(DECIMAL64, text))?;
    let value = if parts.negative { -magnitude } else { magnitude };

    let value = i64::try_from(value).map_err(|_| invalid(DECIMAL64, text))?;
    Ok(Decimal64 {
        value,
        fraction_digits,
    })
}
