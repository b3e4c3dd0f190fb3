use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::{core::PeriodRecord, quantity::energy::KilowattHours};

/// Energy conservation rule of a single period.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Invariant {
    /// Production equals the solar flows.
    #[display("solar production")]
    SolarProduction,

    /// Consumption equals the flows into the home.
    #[display("home consumption")]
    HomeConsumption,

    #[display("grid export")]
    GridExport,

    #[display("grid import")]
    GridImport,
}

impl Invariant {
    pub const ALL: [Self; 4] =
        [Self::SolarProduction, Self::HomeConsumption, Self::GridExport, Self::GridImport];

    /// Reported total and the total accounted by the flows.
    pub fn evaluate(self, record: &PeriodRecord) -> (KilowattHours, KilowattHours) {
        let flows = &record.flows;
        match self {
            Self::SolarProduction => (record.solar_production, flows.solar_sum()),
            Self::HomeConsumption => (record.home_consumption, flows.home_sum()),
            Self::GridExport => (record.grid_export, flows.export_sum()),
            Self::GridImport => (record.grid_import, flows.import_sum()),
        }
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct BalanceViolation {
    pub invariant: Invariant,
    pub period: usize,

    /// Sum of the component flows.
    pub expected: KilowattHours,

    /// Reported total.
    pub actual: KilowattHours,

    /// `actual − expected`.
    pub delta: KilowattHours,
}

impl Display for BalanceViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "period {}: {} is {} but the flows account for {}",
            self.period, self.invariant, self.actual, self.expected,
        )
    }
}

/// Check the record against every invariant.
///
/// Only a mismatch strictly greater than the tolerance is a violation.
pub fn check_balance(
    record: &PeriodRecord,
    tolerance: KilowattHours,
) -> impl Iterator<Item = BalanceViolation> + '_ {
    Invariant::ALL.into_iter().filter_map(move |invariant| {
        let (actual, expected) = invariant.evaluate(record);
        let delta = actual - expected;
        (delta.abs() > tolerance).then_some(BalanceViolation {
            invariant,
            period: record.period,
            expected,
            actual,
            delta,
        })
    })
}
