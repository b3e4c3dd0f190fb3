use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    core::{PeriodGrid, Reported},
    error::ReconcileError,
    prelude::*,
    quantity::percentage::Percentage,
    tou::{TouCoverage, fill_gaps, normalize_segments},
};

/// Device control settings of a single period.
#[must_use]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PeriodControl {
    #[serde(alias = "periodIndex", alias = "period_index", alias = "hour")]
    pub period: usize,

    #[serde(default, alias = "gridChargeEnabled", alias = "grid_charge", alias = "gridCharge")]
    pub grid_charge_enabled: bool,

    /// Charge power as a share of the rated power.
    #[serde(default, alias = "chargePowerRate", alias = "charge_rate", alias = "chargeRate")]
    pub charge_power_rate: Percentage,

    #[serde(
        default,
        alias = "dischargePowerRate",
        alias = "discharge_rate",
        alias = "dischargeRate"
    )]
    pub discharge_power_rate: Percentage,
}

impl PeriodControl {
    /// Settings of a period the device reported nothing about.
    pub fn unknown(period: usize) -> Self {
        Self { period, ..Self::default() }
    }
}

/// Display-only layer of what the device is configured to do.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeviceLayer {
    /// `None` when the device schedule is not known at all.
    pub coverage: Option<TouCoverage>,

    pub controls: Vec<PeriodControl>,
}

impl DeviceLayer {
    /// Settings of the period, the last reported one wins.
    pub fn control(&self, period: usize) -> PeriodControl {
        self.controls
            .iter()
            .rev()
            .find(|control| control.period == period)
            .copied()
            .unwrap_or_else(|| PeriodControl::unknown(period))
    }
}

#[derive(Deserialize)]
struct RawDeviceReport {
    #[serde(default, alias = "tou_intervals", alias = "touIntervals")]
    segments: Option<Value>,

    #[serde(default, alias = "settings")]
    controls: Vec<PeriodControl>,
}

/// Build the device layer from the device report `{"segments": [...], "controls": [...]}`,
/// or from the bare array of the segments.
#[instrument(skip_all, fields(grid = ?grid))]
pub fn read_device_report(
    grid: PeriodGrid,
    value: &Value,
) -> Result<Reported<DeviceLayer>, ReconcileError> {
    let report = if value.is_array() {
        // Some devices only report the bare segments:
        RawDeviceReport { segments: Some(value.clone()), controls: Vec::new() }
    } else {
        RawDeviceReport::deserialize(value).map_err(|error| ReconcileError::InvalidRecord {
            position: 0,
            reason: error.to_string(),
        })?
    };
    for control in &report.controls {
        grid.check(control.period)?;
    }
    let mut warnings = Vec::new();
    let coverage = match report.segments {
        Some(segments) => {
            let segments = normalize_segments(&segments)?.drain_into(&mut warnings);
            Some(fill_gaps(grid, &segments)?.drain_into(&mut warnings))
        }
        None => None,
    };
    Ok(Reported::new(DeviceLayer { coverage, controls: report.controls }, warnings))
}
