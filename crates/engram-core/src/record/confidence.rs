use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Confidence score clamped to [0.0, 1.0].
///
/// Out-of-range inputs are clamped on construction rather than rejected: a
/// misbehaving peer must degrade gracefully, not halt convergence.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Confidence(f64);

/// Deserialization goes through [`Confidence::new`], so state received from a
/// peer is clamped exactly like locally constructed values.
impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        f64::deserialize(deserializer).map(Self::new)
    }
}

impl Confidence {
    /// High confidence threshold — records above this are considered reliable.
    pub const HIGH: f64 = 0.8;
    /// Low confidence threshold — records below this may need validation.
    pub const LOW: f64 = 0.3;

    /// Create a new Confidence, clamping to [0.0, 1.0]. Non-finite input
    /// collapses to 0.0.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    /// Get the raw f64 value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Check if confidence is above the high threshold.
    pub fn is_high(self) -> bool {
        self.0 >= Self::HIGH
    }

    /// Check if confidence is below the low threshold.
    pub fn is_low(self) -> bool {
        self.0 < Self::LOW
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self(1.0)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
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
