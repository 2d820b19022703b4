//! Property tests for lexical parsing and canonical forms

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use proptest::prelude::*;
use yangtypes::validators::{decode_binary, parse_decimal64, Decimal64};
use yangtypes::{BitDefs, TypeDefinition, ValidationContext, ValueError, VariantValue};

const BIT_NAMES: [&str; 8] = ["b0", "b1", "b2", "b3", "b4", "b5", "b6", "b7"];

fn whitespace() -> impl Strategy<Value = String> {
    "[ \t\n]{0,3}"
}

fn separator() -> impl Strategy<Value = String> {
    "[ \t\n]{1,3}"
}

proptest! {
    /// Surrounding whitespace never changes an integer's canonical form.
    #[test]
    fn int8_canonical_ignores_whitespace(n in any::<i8>(), pre in whitespace(), post in whitespace()) {
        let ctx = ValidationContext::new();
        let text = format!("{}{}{}", pre, n, post);
        let value = TypeDefinition::int8().validate(&text, &ctx).unwrap();
        prop_assert_eq!(value.canonical_text, n.to_string());
        prop_assert_eq!(value.decoded, VariantValue::Int(i64::from(n)));
    }

    /// Canonical text of an unsigned value parses back to itself.
    #[test]
    fn uint64_canonical_is_stable(n in any::<u64>()) {
        let ctx = ValidationContext::new();
        let ty = TypeDefinition::uint64();
        let first = ty.validate(&n.to_string(), &ctx).unwrap();
        let second = ty.validate(&first.canonical_text, &ctx).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Canonical decimal64 text parses back to the same scaled value.
    #[test]
    fn decimal64_canonical_is_stable(value in any::<i64>(), fd in 1u8..=18) {
        let dec = Decimal64::new(value, fd).unwrap();
        let parsed = parse_decimal64(&dec.canonical(), fd).unwrap();
        prop_assert_eq!(parsed, dec);
    }

    /// One significant digit too many is always rejected.
    #[test]
    fn decimal64_extra_fraction_digit_rejected(fd in 1u8..=17, last in 1u8..=9) {
        let text = format!("1.{}{}", "0".repeat(usize::from(fd)), last);
        let err = parse_decimal64(&text, fd).unwrap_err();
        let is_exceeded = matches!(err, ValueError::FractionDigitsExceeded { limit, .. } if limit == fd);
        prop_assert!(is_exceeded);
    }

    /// Bits canonical order follows positions, not token order or spacing.
    #[test]
    fn bits_canonical_is_position_ordered(
        subset in prop::sample::subsequence(BIT_NAMES.to_vec(), 0..=BIT_NAMES.len())
            .prop_flat_map(|v| Just(v.clone()).prop_shuffle().prop_map(move |s| (v.clone(), s))),
        sep in separator(),
        pre in whitespace(),
    ) {
        let (ordered, shuffled) = subset;
        let ty = TypeDefinition::bits(BitDefs::from_names(BIT_NAMES).unwrap());
        let text = format!("{}{}", pre, shuffled.join(&sep));
        let value = ty.validate(&text, &ValidationContext::new()).unwrap();
        prop_assert_eq!(value.canonical_text, ordered.join(" "));
    }

    /// Any byte string survives base64 encoding and decoding.
    #[test]
    fn binary_decodes_standard_encoding(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let encoded = STANDARD.encode(&bytes);
        let value = decode_binary(&encoded, None).unwrap();
        prop_assert_eq!(value.bytes, bytes);
        prop_assert_eq!(value.canonical, encoded);
    }

    /// Significant length not divisible by four is a length error.
    #[test]
    fn binary_length_must_be_multiple_of_four(text in "[A-Za-z0-9+/]{1,40}") {
        prop_assume!(text.len() % 4 != 0);
        let is_length_error = matches!(decode_binary(&text, None), Err(ValueError::Base64Length { .. }));
        prop_assert!(is_length_error);
    }
}
