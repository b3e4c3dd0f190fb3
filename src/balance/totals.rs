use serde::Serialize;

use crate::{
    core::{EnergyFlows, PeriodRecord},
    quantity::{cost::Cost, energy::KilowattHours},
};

/// Summable fields of a period record.
#[must_use]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::Sub,
)]
pub struct AggregateTotals {
    #[serde(flatten)]
    pub flows: EnergyFlows,

    pub solar_production: KilowattHours,
    pub home_consumption: KilowattHours,
    pub grid_import: KilowattHours,
    pub grid_export: KilowattHours,

    pub cost: Cost,
    pub grid_only_cost: Cost,
    pub savings: Cost,

    pub battery_charged: KilowattHours,
    pub battery_discharged: KilowattHours,

    /// Signed: positive is net charge.
    pub battery_net: KilowattHours,
}

impl AggregateTotals {
    /// Left fold in the iteration order, so that the same input always produces the same bits.
    pub fn fold<'a>(totals: impl IntoIterator<Item = &'a Self>) -> Self {
        totals.into_iter().fold(Self::default(), |mut sum, totals| {
            sum += *totals;
            sum
        })
    }
}

impl From<&PeriodRecord> for AggregateTotals {
    fn from(record: &PeriodRecord) -> Self {
        Self {
            flows: record.flows,
            solar_production: record.solar_production,
            home_consumption: record.home_consumption,
            grid_import: record.grid_import,
            grid_export: record.grid_export,
            cost: record.cost,
            grid_only_cost: record.grid_only_cost,
            savings: record.savings,
            battery_charged: record.battery_action.charged(),
            battery_discharged: record.battery_action.discharged(),
            battery_net: record.battery_action.signed,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{action::BatteryAction, core::Source};

    #[test]
    fn test_from_record() {
        let record = PeriodRecord {
            cost: Cost::from(0.3),
            savings: Cost::from(-0.1),
            battery_action: BatteryAction::from_signed(KilowattHours::from(-1.5)),
            ..PeriodRecord::balanced(
                0,
                Source::Predicted,
                EnergyFlows { battery_to_home: KilowattHours::from(1.5), ..EnergyFlows::default() },
            )
        };
        let totals = AggregateTotals::from(&record);
        assert_abs_diff_eq!(totals.home_consumption.0, 1.5);
        assert_abs_diff_eq!(totals.battery_charged.0, 0.0);
        assert_abs_diff_eq!(totals.battery_discharged.0, 1.5);
        assert_abs_diff_eq!(totals.battery_net.0, -1.5);
        assert_abs_diff_eq!(totals.savings.0, -0.1);
    }

    #[test]
    fn test_sub() {
        let lhs = AggregateTotals { cost: Cost::from(2.0), ..AggregateTotals::default() };
        let rhs = AggregateTotals { cost: Cost::from(0.5), ..AggregateTotals::default() };
        assert_abs_diff_eq!((rhs - lhs).cost.0, -1.5);
    }
}
