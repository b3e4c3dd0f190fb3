use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{
    core::time_of_day::TimeOfDay,
    error::ReconcileError,
};

/// Period resolution of a day.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum PeriodGrid {
    /// 24 periods of an hour.
    #[default]
    Hourly,

    /// 96 periods of 15 minutes.
    QuarterHourly,
}

impl PeriodGrid {
    pub const fn try_from_len(n_periods: usize) -> Result<Self, ReconcileError> {
        match n_periods {
            24 => Ok(Self::Hourly),
            96 => Ok(Self::QuarterHourly),
            _ => Err(ReconcileError::UnsupportedGridSize { n_periods }),
        }
    }

    #[must_use]
    pub const fn n_periods(self) -> usize {
        match self {
            Self::Hourly => 24,
            Self::QuarterHourly => 96,
        }
    }

    #[must_use]
    pub const fn period_minutes(self) -> u16 {
        match self {
            Self::Hourly => 60,
            Self::QuarterHourly => 15,
        }
    }

    #[must_use]
    pub const fn periods(self) -> Range<usize> {
        0..self.n_periods()
    }

    pub const fn check(self, period: usize) -> Result<usize, ReconcileError> {
        if period < self.n_periods() {
            Ok(period)
        } else {
            Err(ReconcileError::PeriodOutOfRange { period, n_periods: self.n_periods() })
        }
    }

    /// Minutes of the day covered by the period, end-exclusive.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn minute_span(self, period: usize) -> Range<u16> {
        let period = (period % self.n_periods()) as u16;
        let start = period * self.period_minutes();
        start..(start + self.period_minutes())
    }

    pub const fn period_start(self, period: usize) -> TimeOfDay {
        TimeOfDay::from_minutes(self.minute_span(period).start)
    }

    /// Period containing the specified time of day.
    #[must_use]
    pub const fn period_of(self, time: TimeOfDay) -> usize {
        (time.minutes() / self.period_minutes()) as usize
    }
}
