use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::quantity::{Quantity, energy::KilowattHours};

/// Activity below this magnitude is considered noise.
pub const ACTION_EPSILON: f64 = 0.01;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryState {
    Charging,
    Discharging,
    #[default]
    Idle,
}

/// What the presentation layer shows for a period.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayAction {
    Charge,
    Discharge,
    #[default]
    Idle,
}

impl From<BatteryState> for DisplayAction {
    fn from(state: BatteryState) -> Self {
        match state {
            BatteryState::Charging => Self::Charge,
            BatteryState::Discharging => Self::Discharge,
            BatteryState::Idle => Self::Idle,
        }
    }
}

impl Display for DisplayAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Charge => write!(f, "Charge"),
            Self::Discharge => write!(f, "Discharge"),
            Self::Idle => write!(f, "Idle"),
        }
    }
}

/// Classify a pair of non-negative charge and discharge quantities.
///
/// A device is never expected to report both at once, but if it momentarily does,
/// the discharge wins.
pub fn classify<const POWER: isize, const TIME: isize, const COST: isize>(
    charge: Quantity<f64, POWER, TIME, COST>,
    discharge: Quantity<f64, POWER, TIME, COST>,
    epsilon: f64,
) -> (Quantity<f64, POWER, TIME, COST>, BatteryState) {
    if discharge.0 > epsilon {
        (-discharge, BatteryState::Discharging)
    } else if charge.0 > epsilon {
        (charge, BatteryState::Charging)
    } else {
        (Quantity(0.0), BatteryState::Idle)
    }
}

/// Canonical battery activity of a period: positive is net charge, negative is net discharge.
#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct BatteryAction {
    pub signed: KilowattHours,
    pub state: BatteryState,
}

impl BatteryAction {
    pub const IDLE: Self = Self { signed: KilowattHours::ZERO, state: BatteryState::Idle };

    pub fn classify(charged: KilowattHours, discharged: KilowattHours) -> Self {
        Self::classify_with(charged, discharged, ACTION_EPSILON)
    }

    pub fn classify_with(charged: KilowattHours, discharged: KilowattHours, epsilon: f64) -> Self {
        let (signed, state) = classify(charged, discharged, epsilon);
        Self { signed, state }
    }

    pub fn from_signed(signed: KilowattHours) -> Self {
        Self::from_signed_with(signed, ACTION_EPSILON)
    }

    /// Classify the single signed representation by splitting it into the charge and discharge.
    pub fn from_signed_with(signed: KilowattHours, epsilon: f64) -> Self {
        Self::classify_with(
            signed.max(KilowattHours::ZERO),
            (-signed).max(KilowattHours::ZERO),
            epsilon,
        )
    }

    /// Non-negative charged energy.
    pub fn charged(self) -> KilowattHours {
        self.signed.max(KilowattHours::ZERO)
    }

    /// Non-negative discharged energy.
    pub fn discharged(self) -> KilowattHours {
        (-self.signed).max(KilowattHours::ZERO)
    }

    #[must_use]
    pub fn display_action(self) -> DisplayAction {
        self.state.into()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_idle() {
        let action = BatteryAction::classify(KilowattHours::ZERO, KilowattHours::ZERO);
        assert_eq!(action, BatteryAction::IDLE);
    }

    #[test]
    fn test_charging() {
        let action = BatteryAction::classify(KilowattHours::from(500.0), KilowattHours::ZERO);
        assert_eq!(action.state, BatteryState::Charging);
        assert_abs_diff_eq!(action.signed.0, 500.0);
    }

    #[test]
    fn test_discharging() {
        let action = BatteryAction::classify(KilowattHours::ZERO, KilowattHours::from(1.2));
        assert_eq!(action.state, BatteryState::Discharging);
        assert_abs_diff_eq!(action.signed.0, -1.2);
        assert_abs_diff_eq!(action.discharged().0, 1.2);
        assert_abs_diff_eq!(action.charged().0, 0.0);
    }

    #[test]
    fn test_noise_is_idle() {
        let action = BatteryAction::classify(KilowattHours::from(0.01), KilowattHours::from(0.005));
        assert_eq!(action, BatteryAction::IDLE);
    }

    #[test]
    fn test_from_signed() {
        assert_eq!(
            BatteryAction::from_signed(KilowattHours::from(-0.5)).display_action(),
            DisplayAction::Discharge,
        );
        assert_eq!(
            BatteryAction::from_signed(KilowattHours::from(0.5)).display_action(),
            DisplayAction::Charge,
        );
        assert_eq!(BatteryAction::from_signed(KilowattHours::from(-0.001)), BatteryAction::IDLE);
    }

    proptest! {
        #[test]
        fn discharge_wins_the_tie(charge in 0.011_f64..1.0e4, discharge in 0.011_f64..1.0e4) {
            let (signed, state) = classify(
                KilowattHours::from(charge),
                KilowattHours::from(discharge),
                ACTION_EPSILON,
            );
            prop_assert_eq!(state, BatteryState::Discharging);
            prop_assert_eq!(signed.0, -discharge);
        }

        #[test]
        fn signed_matches_state(charge in 0.0_f64..10.0, discharge in 0.0_f64..10.0) {
            let action =
                BatteryAction::classify(KilowattHours::from(charge), KilowattHours::from(discharge));
            match action.state {
                BatteryState::Charging => prop_assert!(action.signed.0 > 0.0),
                BatteryState::Discharging => prop_assert!(action.signed.0 < 0.0),
                BatteryState::Idle => prop_assert_eq!(action.signed.0, 0.0),
            }
        }
    }
}
