use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Whole percentage, always within `0..=100`.
#[must_use]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64")]
pub struct Percentage(u8);

impl Percentage {
    pub const ZERO: Self = Self(0);
    pub const FULL: Self = Self(100);

    /// Build the percentage, saturating the value into `0..=100`.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn saturating_from(value: f64) -> Self {
        if value.is_nan() { Self::ZERO } else { Self(value.round().clamp(0.0, 100.0) as u8) }
    }

}

impl From<f64> for Percentage {
    fn from(value: f64) -> Self {
        Self::saturating_from(value)
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
