use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{
    core::{PeriodGrid, TimeOfDay, time_of_day::MINUTES_PER_DAY},
    tou::mode::BatteryMode,
};

/// Segment ID of a synthesized default interval.
pub const DEFAULT_SEGMENT_ID: u8 = 0;

/// Hardware schedule slots are numbered `1..=N_SEGMENT_SLOTS`.
pub const N_SEGMENT_SLOTS: u8 = 9;

/// Origin of a schedule interval, ordered by the sort priority.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Reported by the device.
    Configured,

    /// Synthesized to cover the time no configured segment covers.
    Default,

    /// Placeholder of an unused hardware slot.
    Empty,
}

/// Battery-mode window of the device schedule.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TouInterval {
    pub segment_id: u8,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub battery_mode: BatteryMode,
    pub is_enabled: bool,
    pub kind: SegmentKind,
}

impl TouInterval {
    pub const fn configured(
        segment_id: u8,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
        battery_mode: BatteryMode,
    ) -> Self {
        Self {
            segment_id,
            start_time,
            end_time,
            battery_mode,
            is_enabled: true,
            kind: SegmentKind::Configured,
        }
    }

    /// Placeholder of the unused slot.
    pub const fn empty(segment_id: u8) -> Self {
        Self {
            segment_id,
            start_time: TimeOfDay::MIDNIGHT,
            end_time: TimeOfDay::MIDNIGHT,
            battery_mode: BatteryMode::LoadFirst,
            is_enabled: false,
            kind: SegmentKind::Empty,
        }
    }

    /// Load-first interval spanning the periods `first..=last`.
    pub const fn default_for(grid: PeriodGrid, first: usize, last: usize) -> Self {
        Self {
            segment_id: DEFAULT_SEGMENT_ID,
            start_time: grid.period_start(first),
            end_time: TimeOfDay::from_minutes(grid.minute_span(last).end - 1),
            battery_mode: BatteryMode::LoadFirst,
            is_enabled: true,
            kind: SegmentKind::Default,
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.kind == SegmentKind::Configured
    }

    /// Whether the interval actually governs any time.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_enabled && self.kind != SegmentKind::Empty
    }

    /// Exclusive end minute.
    ///
    /// Device end times are exclusive, except for one which stops a minute short of a quarter-hour
    /// boundary: devices cannot express `24:00`, so `23:59` closes the day, and likewise `05:59`
    /// closes the hour.
    #[must_use]
    pub const fn end_minute(&self) -> u16 {
        let end = self.end_time.minutes();
        if (end + 1) % 15 == 0 { end + 1 } else { end }
    }

    /// Covered minutes of the day: none, one span, or two when the interval wraps past midnight.
    pub fn spans(&self) -> impl Iterator<Item = Range<u16>> {
        let start = self.start_time.minutes();
        let end = self.end_minute();
        let (first, second) =
            if start <= end { (start..end, 0..0) } else { (start..MINUTES_PER_DAY, 0..end) };
        [first, second].into_iter().filter(|span| !span.is_empty())
    }

    /// Whether the interval covers at least a minute of the span.
    #[must_use]
    pub fn touches(&self, span: &Range<u16>) -> bool {
        self.spans().any(|own| own.start < span.end && span.start < own.end)
    }

    /// Whether the interval covers at least a minute of the period.
    #[must_use]
    pub fn touches_period(&self, grid: PeriodGrid, period: usize) -> bool {
        self.touches(&grid.minute_span(period))
    }

    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.spans().any(|span| other.touches(&span))
    }
}
