use chrono::{DateTime, Local};
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::{
    balance::AggregateTotals,
    core::PeriodGrid,
    error::ReconcileError,
    prelude::*,
    snapshot::{Snapshot, values::PeriodValues},
};

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub period: usize,
    pub values_a: PeriodValues,
    pub values_b: PeriodValues,

    /// `values_b − values_a`.
    pub delta: PeriodValues,
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TotalsComparison {
    pub a: AggregateTotals,
    pub b: AggregateTotals,

    /// Sum of the per-period deltas.
    pub delta: AggregateTotals,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SnapshotInfo {
    pub captured_at: DateTime<Local>,
    pub optimization_period: usize,
}

impl From<&Snapshot> for SnapshotInfo {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            captured_at: snapshot.captured_at,
            optimization_period: snapshot.optimization_period,
        }
    }
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnapshotComparison {
    pub a: SnapshotInfo,
    pub b: SnapshotInfo,
    pub grid: PeriodGrid,
    pub period_comparisons: Vec<PeriodComparison>,
    pub totals: TotalsComparison,

    /// Period of the largest cost change, the earliest one on ties.
    pub largest_cost_change: Option<usize>,
}

/// Compare the snapshots period by period.
#[instrument(skip_all, fields(a = %a.captured_at, b = %b.captured_at))]
pub fn compare(a: &Snapshot, b: &Snapshot) -> Result<SnapshotComparison, ReconcileError> {
    if a.grid() != b.grid() {
        return Err(ReconcileError::SnapshotGridMismatch {
            a: a.grid().n_periods(),
            b: b.grid().n_periods(),
        });
    }

    let period_comparisons: Vec<_> = a
        .records()
        .iter()
        .zip(b.records())
        .map(|(record_a, record_b)| {
            let values_a = PeriodValues::from(record_a);
            let values_b = PeriodValues::from(record_b);
            let delta = values_b - values_a;
            PeriodComparison { period: record_a.period, values_a, values_b, delta }
        })
        .collect();

    let fold = |select: fn(&PeriodComparison) -> &AggregateTotals| {
        AggregateTotals::fold(period_comparisons.iter().map(select))
    };
    let totals = TotalsComparison {
        a: fold(|comparison| &comparison.values_a.totals),
        b: fold(|comparison| &comparison.values_b.totals),
        delta: fold(|comparison| &comparison.delta.totals),
    };
    let largest_cost_change = period_comparisons
        .iter()
        .rev()
        .max_by_key(|comparison| OrderedFloat(comparison.delta.totals.cost.abs().0))
        .filter(|comparison| comparison.delta.totals.cost.0 != 0.0)
        .map(|comparison| comparison.period);
    debug!(cost_delta = %totals.delta.cost, ?largest_cost_change, "compared");

    Ok(SnapshotComparison {
        a: a.into(),
        b: b.into(),
        grid: a.grid(),
        period_comparisons,
        totals,
        largest_cost_change,
    })
}
