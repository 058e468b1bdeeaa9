//! Number text helpers
//!
//! The engine keeps the display value as text so that in-progress input such
//! as `"0."` or `"12.50"` survives untouched. The functions here are the only
//! bridge between that text and `f64`, JSON included.

/// Parses a display literal into a number.
///
/// Accepts plain decimals with an optional sign, the `"5."` and `".5"` forms,
/// exponents, and `Infinity`/`-Infinity`. Anything else, including the
/// override display token and `NaN`, yields `None`.
#[must_use]
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    // `str::parse` also accepts "inf" and "nan"; keep to digits and exponents
    let numeric = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'));
    if !numeric {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Formats a number for display.
///
/// Produces the shortest text that round-trips. Negative zero prints as
/// `"0"`. Magnitudes of at least `1e21` or below `1e-6` use exponent notation
/// with an explicit sign (`1e+21`, `1.5e-7`).
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let text = format!("{value:e}");
        return match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => text,
        };
    }

    format!("{value}")
}

/// Parses text written by [`format_number`], including `NaN`.
#[must_use]
pub fn parse_formatted(text: &str) -> Option<f64> {
    if text.trim() == "NaN" {
        Some(f64::NAN)
    } else {
        parse_number(text)
    }
}

/// Serde adapter for `f64` fields that may hold non-finite values.
///
/// Finite values stay JSON numbers. `Infinity`, `-Infinity` and `NaN` have no
/// JSON number form and are written as their display text instead.
pub(crate) mod serde_float {
    use super::{format_number, parse_formatted};
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    pub(crate) fn serialize<S: Serializer>(
        value: &f64,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_str(&format_number(*value))
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<f64, D::Error> {
        deserializer.deserialize_any(FloatVisitor)
    }

    struct FloatVisitor;

    impl<'de> Visitor<'de> for FloatVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number, \"Infinity\", \"-Infinity\" or \"NaN\"")
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<f64, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<f64, E> {
            parse_formatted(value)
                .ok_or_else(|| E::invalid_value(de::Unexpected::Str(value), &self))
        }
    }

    struct Float(f64);

    impl Serialize for Float {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serialize(&self.0, serializer)
        }
    }

    impl<'de> Deserialize<'de> for Float {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserialize(deserializer).map(Float)
        }
    }

    /// Same encoding for `Option<f64>`
    pub(crate) mod option {
        use super::Float;
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub(crate) fn serialize<S: Serializer>(
            value: &Option<f64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            value.map(Float).serialize(serializer)
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<f64>, D::Error> {
            Ok(Option::<Float>::deserialize(deserializer)?.map(|f| f.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ===== parse_number tests =====

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("-7"), Some(-7.0));
    }

    #[test]
    fn test_parse_partial_decimals() {
        assert_eq!(parse_number("0."), Some(0.0));
        assert_eq!(parse_number("12."), Some(12.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("3.25"), Some(3.25));
    }

    #[test]
    fn test_parse_exponent_forms() {
        assert_eq!(parse_number("1e+21"), Some(1e21));
        assert_eq!(parse_number("1.5e-7"), Some(1.5e-7));
    }

    #[test]
    fn test_parse_infinity() {
        assert_eq!(parse_number("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_number("-Infinity"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn test_parse_rejects_non_numbers() {
        assert_eq!(parse_number("Hello World"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("."), None);
    }

    // ===== format_number tests =====

    #[test]
    fn test_format_integer() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-5.0), "-5");
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(0.125), "0.125");
    }

    #[test]
    fn test_format_float_noise_is_kept() {
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn test_format_negative_zero() {
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_format_large_uses_exponent() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e30), "-2.5e+30");
        assert_eq!(format_number(1e20), "100000000000000000000");
    }

    #[test]
    fn test_format_small_uses_exponent() {
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(0.000001), "0.000001");
    }

    #[test]
    fn test_format_special_values() {
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_parse_formatted_accepts_nan() {
        assert!(parse_formatted("NaN").unwrap().is_nan());
        assert_eq!(parse_formatted("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_formatted("2.5"), Some(2.5));
        assert_eq!(parse_formatted("Hello World"), None);
    }

    // ===== serde_float tests =====

    #[derive(Debug, serde::Serialize, serde::Deserialize)]
    struct Reading {
        #[serde(with = "serde_float")]
        value: f64,
        #[serde(default, with = "serde_float::option")]
        maybe: Option<f64>,
    }

    #[test]
    fn test_serde_float_finite_stays_number() {
        let json = serde_json::to_string(&Reading {
            value: 2.5,
            maybe: Some(-1.0),
        })
        .unwrap();
        assert_eq!(json, r#"{"value":2.5,"maybe":-1.0}"#);
    }

    #[test]
    fn test_serde_float_non_finite_as_text() {
        let json = serde_json::to_string(&Reading {
            value: f64::INFINITY,
            maybe: Some(f64::NAN),
        })
        .unwrap();
        assert_eq!(json, r#"{"value":"Infinity","maybe":"NaN"}"#);

        let back: Reading = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value, f64::INFINITY);
        assert!(back.maybe.unwrap().is_nan());
    }

    #[test]
    fn test_serde_float_reads_integers_and_null() {
        let back: Reading = serde_json::from_str(r#"{"value":7,"maybe":null}"#).unwrap();
        assert_eq!(back.value, 7.0);
        assert_eq!(back.maybe, None);

        let back: Reading = serde_json::from_str(r#"{"value":"-Infinity"}"#).unwrap();
        assert_eq!(back.value, f64::NEG_INFINITY);
        assert_eq!(back.maybe, None);
    }

    #[test]
    fn test_serde_float_rejects_other_text() {
        let result: Result<Reading, _> = serde_json::from_str(r#"{"value":"Hello World"}"#);
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn prop_format_then_parse_round_trips(value in -1e300f64..1e300f64) {
            let text = format_number(value);
            let parsed = parse_number(&text).unwrap();
            if value == 0.0 {
                prop_assert_eq!(parsed, 0.0);
            } else {
                prop_assert_eq!(parsed, value);
            }
        }
    }
}
