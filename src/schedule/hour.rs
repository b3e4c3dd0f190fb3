use std::cmp::Ordering;

use serde::Serialize;

use crate::{
    action::DisplayAction,
    core::{Source, TimeOfDay},
    quantity::{energy::KilowattHours, percentage::Percentage},
    tou::{BatteryMode, TouInterval},
};

/// Position of a period relative to the reference («current») period.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodTiming {
    Past,
    Current,
    Future,
}

impl PeriodTiming {
    #[must_use]
    pub fn of(period: usize, reference_period: usize) -> Self {
        match period.cmp(&reference_period) {
            Ordering::Less => Self::Past,
            Ordering::Equal => Self::Current,
            Ordering::Greater => Self::Future,
        }
    }
}

/// Display-ready view of one period.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScheduleHour {
    pub period: usize,
    pub start_time: TimeOfDay,
    pub timing: PeriodTiming,

    pub strategic_intent: String,

    /// Signed: positive is charge.
    pub battery_action: KilowattHours,

    pub display_action: DisplayAction,

    /// Which record the intent and the action come from.
    pub data_source: Source,

    pub battery_mode: BatteryMode,
    pub grid_charge_enabled: bool,
    pub charge_power_rate: Percentage,
    pub discharge_power_rate: Percentage,

    /// Device interval governing the period, `None` when the device schedule is unknown.
    pub tou: Option<TouInterval>,
}
