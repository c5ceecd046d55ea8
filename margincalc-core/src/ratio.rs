//! Per-unit ratios that may not be computable.

use crate::value::FloatValue;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Marker rendered in place of a ratio that could not be computed.
pub const UNDEFINED_MARKER: &str = "n/a";

/// Result of a division that may have a zero denominator.
///
/// A zero denominator yields [`Ratio::Undefined`] rather than NaN, infinity or a silent
/// zero, so a margin of exactly `0.0` per kg stays distinguishable from "no sellable
/// output to divide by".
///
/// Serialises as a plain number, or `null` when undefined.
///
/// # Example
///
/// ```rust
/// use margincalc_core::ratio::Ratio;
///
/// assert_eq!(Ratio::divide(10.0, 4.0), Ratio::Defined(2.5));
/// assert_eq!(Ratio::divide(10.0, 0.0), Ratio::Undefined);
/// assert_eq!(Ratio::divide(0.0, 4.0).value(), Some(0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Ratio {
    /// A computed, finite value.
    Defined(FloatValue),
    /// The denominator was zero (or the quotient was not finite).
    #[default]
    Undefined,
}

impl Ratio {
    /// Divide `numerator` by `denominator`.
    pub fn divide(numerator: FloatValue, denominator: FloatValue) -> Self {
        if denominator == 0.0 {
            return Ratio::Undefined;
        }
        Ratio::from_value(numerator / denominator)
    }

    /// Wrap a value, treating NaN and infinities as undefined.
    pub fn from_value(value: FloatValue) -> Self {
        if value.is_finite() {
            Ratio::Defined(value)
        } else {
            Ratio::Undefined
        }
    }

    pub fn value(&self) -> Option<FloatValue> {
        match self {
            Ratio::Defined(v) => Some(*v),
            Ratio::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Ratio::Defined(_))
    }

    /// Apply `f` to a defined value; undefined stays undefined.
    pub fn map<F: FnOnce(FloatValue) -> FloatValue>(self, f: F) -> Self {
        match self {
            Ratio::Defined(v) => Ratio::from_value(f(v)),
            Ratio::Undefined => Ratio::Undefined,
        }
    }

    /// `self - other`, undefined if either side is undefined.
    pub fn difference(self, other: Ratio) -> Self {
        match (self, other) {
            (Ratio::Defined(a), Ratio::Defined(b)) => Ratio::from_value(a - b),
            _ => Ratio::Undefined,
        }
    }
}

impl From<Option<FloatValue>> for Ratio {
    fn from(value: Option<FloatValue>) -> Self {
        value.map_or(Ratio::Undefined, Ratio::from_value)
    }
}

impl From<Ratio> for Option<FloatValue> {
    fn from(value: Ratio) -> Self {
        value.value()
    }
}

impl fmt::Display for Ratio {
    /// Honours precision, e.g. `format!("{:.2}", ratio)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, f.precision()) {
            (Ratio::Defined(v), Some(p)) => write!(f, "{:.*}", p, v),
            (Ratio::Defined(v), None) => write!(f, "{}", v),
            (Ratio::Undefined, _) => f.write_str(UNDEFINED_MARKER),
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<FloatValue>::deserialize(deserializer).map(Ratio::from)
    }
}
