//! Precedence merge of the forecast, the telemetry and the device settings.

pub mod device;
pub mod hour;

pub use self::{
    device::{DeviceLayer, PeriodControl, read_device_report},
    hour::{PeriodTiming, ScheduleHour},
};
use crate::{
    action::{ACTION_EPSILON, BatteryAction, DisplayAction},
    core::{PeriodGrid, PeriodRecord, Source},
    prelude::*,
    tou::BatteryMode,
};

/// Everything the merge needs to know besides the records.
///
/// The reference period is always explicit: the merge never looks at the clock.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct MergeContext {
    pub grid: PeriodGrid,

    /// The «current» period: telemetry cannot exist after it.
    pub reference_period: usize,

    pub action_epsilon: f64,
}

impl MergeContext {
    pub const fn new(grid: PeriodGrid, reference_period: usize) -> Self {
        Self { grid, reference_period, action_epsilon: ACTION_EPSILON }
    }

    #[must_use]
    pub fn timing(&self, period: usize) -> PeriodTiming {
        PeriodTiming::of(period, self.reference_period)
    }
}

/// Merge a single period.
///
/// The telemetry wins over the forecast for the intent and the battery action, while the device
/// layer only contributes the display settings. Missing data falls back to idle defaults, so the
/// merge never fails. The data source is the one the winning record is tagged with.
pub fn merge(
    context: &MergeContext,
    period: usize,
    schedule: Option<&PeriodRecord>,
    actual: Option<&PeriodRecord>,
    device: &DeviceLayer,
) -> ScheduleHour {
    let timing = context.timing(period);
    let actual = actual.filter(|_| timing != PeriodTiming::Future);
    let winner = actual.or(schedule);
    let data_source = winner.map_or(Source::Predicted, |record| record.source);

    let classify = |record: &PeriodRecord| {
        BatteryAction::from_signed_with(record.battery_action.signed, context.action_epsilon)
    };
    let battery_action = winner.map_or(BatteryAction::IDLE, classify);
    let display_action = battery_action.display_action();

    // The forecast only explains the period when it points in the same direction:
    let explaining = schedule.filter(|record| classify(record).state == battery_action.state);
    let strategic_intent = actual
        .and_then(|record| record.strategic_intent.clone())
        .or_else(|| explaining.and_then(|record| record.strategic_intent.clone()))
        .unwrap_or_else(|| fallback_intent(display_action).to_owned());

    let tou = device.coverage.as_ref().and_then(|coverage| coverage.lookup(period)).copied();
    let control = device.control(period);

    ScheduleHour {
        period,
        start_time: context.grid.period_start(period),
        timing,
        strategic_intent,
        battery_action: battery_action.signed,
        display_action,
        data_source,
        battery_mode: tou.map_or(BatteryMode::LoadFirst, |interval| interval.battery_mode),
        grid_charge_enabled: control.grid_charge_enabled,
        charge_power_rate: control.charge_power_rate,
        discharge_power_rate: control.discharge_power_rate,
        tou,
    }
}

/// Merge the whole grid.
///
/// The records are layered by their own source tag, whichever feed they came in: a combined
/// feed may carry both. Records outside of the grid are ignored. When a layer has a period more
/// than once, the last record wins, the telemetry feed after the forecast one.
#[instrument(skip_all, fields(grid = ?context.grid, reference_period = context.reference_period))]
pub fn merge_day(
    context: &MergeContext,
    forecast: &[PeriodRecord],
    telemetry: &[PeriodRecord],
    device: &DeviceLayer,
) -> Vec<ScheduleHour> {
    let (actual, predicted): (Vec<_>, Vec<_>) =
        forecast.iter().chain(telemetry).partition(|record| record.is_actual());
    let actual = index_by_period(context.grid, actual);
    let predicted = index_by_period(context.grid, predicted);
    let hours: Vec<_> = context
        .grid
        .periods()
        .map(|period| merge(context, period, predicted[period], actual[period], device))
        .collect();
    debug!(
        n_actual = hours.iter().filter(|hour| hour.data_source == Source::Actual).count(),
        n_hours = hours.len(),
        "merged",
    );
    hours
}

fn index_by_period(grid: PeriodGrid, records: Vec<&PeriodRecord>) -> Vec<Option<&PeriodRecord>> {
    let mut index = vec![None; grid.n_periods()];
    for record in records {
        if let Some(slot) = index.get_mut(record.period) {
            *slot = Some(record);
        } else {
            warn!(period = record.period, "ignoring the record outside of the grid");
        }
    }
    index
}

const fn fallback_intent(action: DisplayAction) -> &'static str {
    match action {
        DisplayAction::Charge => "CHARGE",
        DisplayAction::Discharge => "DISCHARGE",
        DisplayAction::Idle => "IDLE",
    }
}
