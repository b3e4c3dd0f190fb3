use std::{fmt::Debug, fs, path::Path};

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    action::ACTION_EPSILON,
    balance::BALANCE_TOLERANCE,
    core::PeriodGrid,
    normalize::Normalizer,
    prelude::*,
    quantity::energy::KilowattHours,
    schedule::MergeContext,
};

/// Tolerances and the period resolution.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct Config {
    #[builder(default)]
    pub grid: PeriodGrid,

    /// Largest mismatch between a reported total and its flows which is still not a violation.
    #[builder(default = BALANCE_TOLERANCE)]
    pub balance_tolerance: KilowattHours,

    /// Battery activity below this magnitude is idle.
    #[builder(default = ACTION_EPSILON)]
    pub action_epsilon: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Config {
    /// Read the configuration, falling back to the defaults when the file does not exist.
    #[instrument(name = "reading the configuration…")]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read `{}`", path.display()))?;
            Self::from_toml(&text).with_context(|| format!("failed to parse `{}`", path.display()))
        } else {
            debug!("no configuration file, using the defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        ensure!(
            config.balance_tolerance.is_finite() && config.balance_tolerance >= KilowattHours::ZERO,
            "balance tolerance must be a non-negative number, got {}",
            config.balance_tolerance,
        );
        ensure!(
            config.action_epsilon.is_finite() && config.action_epsilon >= 0.0,
            "action epsilon must be a non-negative number, got {}",
            config.action_epsilon,
        );
        Ok(config)
    }

    pub const fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.grid, self.action_epsilon)
    }

    pub const fn merge_context(&self, reference_period: usize) -> MergeContext {
        MergeContext { grid: self.grid, reference_period, action_epsilon: self.action_epsilon }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_defaults() -> Result {
        let config = Config::from_toml("")?;
        assert_eq!(config, Config::default());
        assert_eq!(config.grid, PeriodGrid::Hourly);
        assert_abs_diff_eq!(config.balance_tolerance.0, 0.05);
        assert_abs_diff_eq!(config.action_epsilon, 0.01);
        Ok(())
    }

    #[test]
    fn test_from_toml() -> Result {
        let config = Config::from_toml("grid = \"quarter_hourly\"\nbalance_tolerance = 0.1\n")?;
        assert_eq!(config.grid, PeriodGrid::QuarterHourly);
        assert_abs_diff_eq!(config.balance_tolerance.0, 0.1);
        assert_eq!(config.normalizer().grid, PeriodGrid::QuarterHourly);
        assert_eq!(config.merge_context(5).reference_period, 5);
        Ok(())
    }

    #[test]
    fn test_negative_tolerance() {
        assert!(Config::from_toml("balance_tolerance = -1.0").is_err());
    }

    #[test]
    fn test_missing_file() -> Result {
        assert_eq!(Config::read_from("does-not-exist.toml")?, Config::default());
        Ok(())
    }
}
