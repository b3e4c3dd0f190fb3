use serde::Serialize;

use crate::{
    balance::AggregateTotals,
    core::PeriodRecord,
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
};

/// Comparable values of a single period.
#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, derive_more::Sub)]
pub struct PeriodValues {
    #[serde(flatten)]
    pub totals: AggregateTotals,

    /// Intensive: compared per period, never summed.
    pub price: KilowattHourRate,

    /// Intensive: compared per period, never summed.
    pub battery_soe_end: KilowattHours,
}

impl From<&PeriodRecord> for PeriodValues {
    fn from(record: &PeriodRecord) -> Self {
        let mut totals = AggregateTotals::from(record);
        // Snapshots of different optimizer versions disagree on the savings, so derive them:
        totals.savings = totals.grid_only_cost - totals.cost;
        Self { totals, price: record.price, battery_soe_end: record.battery_soe_end }
    }
}
