//! Energy totals and conservation checks over normalized records.

pub mod totals;
pub mod violation;

use enumset::EnumSet;
use serde::Serialize;

pub use self::{
    totals::AggregateTotals,
    violation::{BalanceViolation, Invariant, check_balance},
};
use crate::{
    core::{PeriodRecord, Source},
    prelude::*,
    quantity::{Quantity, energy::KilowattHours},
};

/// Default tolerance of the conservation checks.
pub const BALANCE_TOLERANCE: KilowattHours = Quantity(0.05);

#[must_use]
#[derive(Clone, Debug, Default, Serialize)]
pub struct Aggregation {
    pub totals: AggregateTotals,

    /// Number of the selected records.
    pub n_records: usize,

    pub balance_violations: Vec<BalanceViolation>,
}

impl Aggregation {
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.balance_violations.is_empty()
    }
}

/// Sum the records of the selected sources in their input order, checking each of them.
#[instrument(skip_all, fields(n_records = records.len(), selection = ?selection))]
pub fn aggregate(
    records: &[PeriodRecord],
    selection: EnumSet<Source>,
    tolerance: KilowattHours,
) -> Aggregation {
    let mut aggregation = Aggregation::default();
    for record in records.iter().filter(|record| selection.contains(record.source)) {
        aggregation.totals += AggregateTotals::from(record);
        aggregation.n_records += 1;
        aggregation.balance_violations.extend(check_balance(record, tolerance));
    }
    debug!(
        n_selected = aggregation.n_records,
        n_violations = aggregation.balance_violations.len(),
        "aggregated",
    );
    aggregation
}
