use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::{NaiveTime, Timelike};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::error::ReconcileError;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Minute-precision time of day.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    /// The last minute of the day, also used as an end time meaning «until midnight».
    pub const END_OF_DAY: Self = Self { hour: 23, minute: 59 };

    pub fn new(hour: u8, minute: u8) -> Result<Self, ReconcileError> {
        if hour < 24 && minute < 60 {
            Ok(Self { hour, minute })
        } else {
            Err(ReconcileError::InvalidTimeOfDay { value: format!("{hour:02}:{minute:02}") })
        }
    }

    /// Build the time from the minute of the day, wrapping around midnight.
    #[expect(clippy::cast_possible_truncation)]
    pub const fn from_minutes(minutes: u16) -> Self {
        let minutes = minutes % MINUTES_PER_DAY;
        Self { hour: (minutes / 60) as u8, minute: (minutes % 60) as u8 }
    }

    /// Minute of the day.
    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ReconcileError;

    /// Parse `HH:MM` or `HH:MM:SS`, ignoring the seconds.
    ///
    /// Some inverters report the end of the day as `24:00`, which is read as [`Self::END_OF_DAY`].
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let error = || ReconcileError::InvalidTimeOfDay { value: value.to_owned() };
        let mut parts = value.trim().split(':');
        let hour: u8 = parts.next().and_then(|part| part.parse().ok()).ok_or_else(error)?;
        let minute: u8 = parts.next().and_then(|part| part.parse().ok()).ok_or_else(error)?;
        if let Some(seconds) = parts.next() {
            seconds.parse::<u8>().ok().filter(|seconds| *seconds < 60).ok_or_else(error)?;
        }
        if parts.next().is_some() {
            return Err(error());
        }
        if (hour, minute) == (24, 0) {
            return Ok(Self::END_OF_DAY);
        }
        Self::new(hour, minute).map_err(|_| error())
    }
}

impl From<NaiveTime> for TimeOfDay {
    #[expect(clippy::cast_possible_truncation)]
    fn from(time: NaiveTime) -> Self {
        Self { hour: time.hour() as u8, minute: time.minute() as u8 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ok() -> Result<(), ReconcileError> {
        assert_eq!("06:30".parse::<TimeOfDay>()?, TimeOfDay::new(6, 30)?);
        assert_eq!("6:05:59".parse::<TimeOfDay>()?, TimeOfDay::new(6, 5)?);
        assert_eq!("24:00".parse::<TimeOfDay>()?, TimeOfDay::END_OF_DAY);
        Ok(())
    }

    #[test]
    fn test_parse_invalid() {
        for value in ["", "12", "25:00", "12:60", "aa:bb", "12:00:00:00", "12:00:61"] {
            assert!(value.parse::<TimeOfDay>().is_err(), "{value}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeOfDay::from_minutes(5 * 60 + 59).to_string(), "05:59");
    }

    #[test]
    fn test_from_minutes_wraps() {
        assert_eq!(TimeOfDay::from_minutes(MINUTES_PER_DAY + 1), TimeOfDay::from_minutes(1));
    }

    #[test]
    fn test_serde_as_string() -> Result<(), serde_json::Error> {
        let time: TimeOfDay = serde_json::from_str("\"17:00\"")?;
        assert_eq!(serde_json::to_string(&time)?, "\"17:00\"");
        Ok(())
    }
}
