pub mod cost;
pub mod energy;
pub mod percentage;
pub mod rate;

use serde::{Deserialize, Serialize};

/// Dimensioned quantity.
///
/// The const parameters are the exponents of power, time and cost, so that for example
/// energy is `Quantity<f64, 1, 1, 0>` and an energy rate is `Quantity<f64, -1, -1, 1>`.
#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
#[serde(transparent)]
pub struct Quantity<T, const POWER: isize, const TIME: isize, const COST: isize>(pub T);

impl<T, const POWER: isize, const TIME: isize, const COST: isize> Quantity<T, POWER, TIME, COST>
where
    Self: PartialOrd,
{
    #[must_use]
    pub fn max(mut self, rhs: Self) -> Self {
        if rhs > self {
            self = rhs;
        }
        self
    }
}

impl<const POWER: isize, const TIME: isize, const COST: isize> Quantity<f64, POWER, TIME, COST> {
    pub const ZERO: Self = Self(0.0);

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::{Debug, Formatter};

    use super::*;

    pub type Bare<T> = Quantity<T, 0, 0, 0>;

    impl<T: Debug> Debug for Bare<T> {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }

    #[test]
    fn test_max() {
        assert_eq!(Bare::from(1).max(Bare::from(2)), Bare::from(2));
        assert_eq!(Bare::from(2).max(Bare::from(1)), Bare::from(2));
    }

    #[test]
    fn test_abs() {
        assert_eq!(Bare::from(-1.5).abs(), Bare::from(1.5));
    }

    #[test]
    fn test_deserialize_transparent() {
        let quantity: Bare<f64> = serde_json::from_str("0.25").unwrap();
        assert_eq!(quantity, Bare::from(0.25));
    }
}
