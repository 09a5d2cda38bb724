//! Confidence score clamped to the unit interval

use std::fmt;

use serde::{Deserialize, Serialize};

/// A confidence value in `[0.0, 1.0]`.
///
/// Out-of-range inputs are clamped and non-finite inputs become `0.0`, which
/// is also the value used when a provider reports no confidence at all.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    /// Confidence used when nothing is known
    pub const UNKNOWN: Self = Self(0.0);

    /// Create a confidence, clamping into `[0, 1]`
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self::UNKNOWN
        }
    }

    /// Map an optional provider score, defaulting to [`Confidence::UNKNOWN`]
    pub fn from_optional(value: Option<f64>) -> Self {
        value.map_or(Self::UNKNOWN, Self::new)
    }

    /// The raw value
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_zero() {
        assert!((Confidence::default().value()).abs() < f64::EPSILON);
        assert!((Confidence::from_optional(None).value()).abs() < f64::EPSILON);
    }

    #[test]
    fn values_are_clamped() {
        assert!((Confidence::new(1.7).value() - 1.0).abs() < f64::EPSILON);
        assert!((Confidence::new(-0.2).value()).abs() < f64::EPSILON);
        assert!((Confidence::new(0.42).value() - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn nan_becomes_unknown() {
        assert_eq!(Confidence::new(f64::NAN), Confidence::UNKNOWN);
        assert_eq!(Confidence::new(f64::INFINITY), Confidence::UNKNOWN);
    }

    #[test]
    fn deserializing_clamps() {
        let c: Confidence = serde_json::from_str("3.5").unwrap();
        assert!((c.value() - 1.0).abs() < f64::EPSILON);
    }
}
