//! Lenient numeric input handling.
//!
//! Every numeric input of a product falls back to `0.0` when it is absent, blank,
//! non-numeric or non-finite. Nothing here returns an error: coercion is part of the
//! calculator's contract rather than a validation step.

use serde::de::{self, Deserializer, Visitor};
use std::fmt;

/// Floating point type used for all quantities, prices and costs.
pub type FloatValue = f64;

/// Replace non-finite values (NaN, ±inf) with zero.
pub fn coerce_number(value: FloatValue) -> FloatValue {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Parse a single text cell, returning `None` if it does not hold a finite number.
///
/// Surrounding whitespace is ignored. Only `.` is a decimal separator; `2,5` is not a
/// number.
pub fn parse_cell(cell: &str) -> Option<FloatValue> {
    cell.trim()
        .parse::<FloatValue>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse a text cell, coercing anything that is not a finite number to `0.0`.
pub fn coerce_cell(cell: &str) -> FloatValue {
    parse_cell(cell).unwrap_or(0.0)
}

/// Serde adapter that accepts numbers, numeric strings, booleans or nothing at all.
///
/// Booleans read as `1.0` and `0.0`.
///
/// Used with `#[serde(default, deserialize_with = "lenient_f64")]` so a session file
/// with `raw_qty_kg = "abc"` loads as `0.0` instead of being rejected.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<FloatValue, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientVisitor;

    impl<'de> Visitor<'de> for LenientVisitor {
        type Value = FloatValue;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number, or anything that should be treated as zero")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(coerce_number(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v as FloatValue)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v as FloatValue)
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(if v { 1.0 } else { 0.0 })
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(coerce_cell(v))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(0.0)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(0.0)
        }

        fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
        where
            D2: Deserializer<'de>,
        {
            deserializer.deserialize_any(LenientVisitor)
        }
    }

    deserializer.deserialize_any(LenientVisitor)
}
