//! Time-stamped forecast snapshots and their comparison.

pub mod comparison;
pub mod values;

use bon::bon;
use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use self::{
    comparison::{PeriodComparison, SnapshotComparison, SnapshotInfo, TotalsComparison, compare},
    values::PeriodValues,
};
use crate::{
    core::{PeriodGrid, PeriodRecord, Reported},
    error::ReconcileError,
    normalize::Normalizer,
    prelude::*,
};

/// Forecast of a full day as the optimizer saw it at some moment.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub captured_at: DateTime<Local>,

    /// Period in which the optimizer produced the forecast.
    pub optimization_period: usize,

    grid: PeriodGrid,

    /// Exactly one record per period, ordered.
    records: Vec<PeriodRecord>,
}

#[bon]
impl Snapshot {
    /// Validate that the records cover a supported grid exactly once.
    #[builder]
    pub fn new(
        captured_at: DateTime<Local>,
        optimization_period: usize,
        records: Vec<PeriodRecord>,
    ) -> Result<Self, ReconcileError> {
        let mut records = records;
        records.sort_by_key(|record| record.period);
        let grid = infer_grid(&records)?;
        for record in &records {
            grid.check(record.period)?;
        }
        if let Some((duplicate, _)) =
            records.iter().tuple_windows().find(|(lhs, rhs)| lhs.period == rhs.period)
        {
            return Err(ReconcileError::DuplicatePeriod { period: duplicate.period });
        }
        if let Some(period) = grid
            .periods()
            .find(|period| records.get(*period).map(|record| record.period) != Some(*period))
        {
            return Err(ReconcileError::MissingPeriod { period });
        }
        grid.check(optimization_period)?;
        Ok(Self { captured_at, optimization_period, grid, records })
    }
}

impl Snapshot {
    pub const fn grid(&self) -> PeriodGrid {
        self.grid
    }

    #[must_use]
    pub fn records(&self) -> &[PeriodRecord] {
        &self.records
    }

    /// Parse `{"optimization_period": …, "captured_at": …, "periods": […]}`.
    #[instrument(skip_all)]
    pub fn from_json(
        normalizer: &Normalizer,
        value: &Value,
    ) -> Result<Reported<Self>, ReconcileError> {
        let raw = RawSnapshot::deserialize(value).map_err(|error| {
            ReconcileError::InvalidRecord { position: 0, reason: error.to_string() }
        })?;
        let n_periods = raw.periods.as_array().map_or(0, Vec::len);
        let normalizer = Normalizer { grid: PeriodGrid::try_from_len(n_periods)?, ..*normalizer };
        let Reported { value: records, warnings } = normalizer.normalize_all(&raw.periods)?;
        let snapshot = Self::builder()
            .captured_at(raw.captured_at)
            .optimization_period(raw.optimization_period)
            .records(records)
            .build()?;
        Ok(Reported::new(snapshot, warnings))
    }
}

#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(alias = "optimizationPeriod", alias = "optimization_hour", alias = "optimizationHour")]
    optimization_period: usize,

    #[serde(alias = "capturedAt", alias = "timestamp", alias = "created_at", alias = "createdAt")]
    captured_at: DateTime<Local>,

    #[serde(alias = "hourly_data", alias = "hourlyData", alias = "records")]
    periods: Value,
}

/// Grid of the records.
///
/// An incomplete or overfull grid is inferred from the largest period, so that the error points
/// at the offending period rather than at the grid size.
fn infer_grid(records: &[PeriodRecord]) -> Result<PeriodGrid, ReconcileError> {
    PeriodGrid::try_from_len(records.len()).or_else(|error| {
        let last_period = records.last().map_or(0, |record| record.period);
        [PeriodGrid::Hourly, PeriodGrid::QuarterHourly]
            .into_iter()
            .find(|grid| last_period < grid.n_periods())
            .filter(|_| !records.is_empty())
            .ok_or(error)
    })
}
