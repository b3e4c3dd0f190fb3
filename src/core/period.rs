use serde::{Deserialize, Serialize};

use crate::{
    action::BatteryAction,
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
};

/// Whether the record is measured or forecast.
#[derive(Debug, Default, Hash, Serialize, Deserialize, enumset::EnumSetType)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Measured telemetry.
    Actual,

    /// Optimizer forecast.
    #[default]
    Predicted,
}

/// Directional energy flows within one period.
#[must_use]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::Sub,
)]
pub struct EnergyFlows {
    pub solar_to_home: KilowattHours,
    pub solar_to_battery: KilowattHours,
    pub solar_to_grid: KilowattHours,
    pub grid_to_home: KilowattHours,
    pub grid_to_battery: KilowattHours,
    pub battery_to_home: KilowattHours,
    pub battery_to_grid: KilowattHours,
}

impl EnergyFlows {
    /// Solar production accounted by the flows.
    pub fn solar_sum(&self) -> KilowattHours {
        self.solar_to_home + self.solar_to_battery + self.solar_to_grid
    }

    /// Household consumption accounted by the flows.
    pub fn home_sum(&self) -> KilowattHours {
        self.solar_to_home + self.grid_to_home + self.battery_to_home
    }

    /// Grid import accounted by the flows.
    pub fn import_sum(&self) -> KilowattHours {
        self.grid_to_home + self.grid_to_battery
    }

    /// Grid export accounted by the flows.
    pub fn export_sum(&self) -> KilowattHours {
        self.solar_to_grid + self.battery_to_grid
    }

    pub fn battery_in(&self) -> KilowattHours {
        self.solar_to_battery + self.grid_to_battery
    }

    pub fn battery_out(&self) -> KilowattHours {
        self.battery_to_home + self.battery_to_grid
    }
}

/// Canonical energy activity of one period.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PeriodRecord {
    /// 0-based index on the period grid.
    pub period: usize,

    pub source: Source,

    #[serde(flatten)]
    pub flows: EnergyFlows,

    pub solar_production: KilowattHours,
    pub home_consumption: KilowattHours,
    pub grid_import: KilowattHours,
    pub grid_export: KilowattHours,

    pub price: KilowattHourRate,
    pub cost: Cost,

    /// Cost of the same consumption served from the grid alone.
    pub grid_only_cost: Cost,

    pub savings: Cost,

    /// Battery state of energy at the end of the period.
    pub battery_soe_end: KilowattHours,

    pub battery_action: BatteryAction,

    /// The optimizer's labelled rationale, for example `EXPORT_ARBITRAGE`.
    pub strategic_intent: Option<String>,
}

impl PeriodRecord {
    /// Build a record whose totals exactly match its flows.
    pub fn balanced(period: usize, source: Source, flows: EnergyFlows) -> Self {
        Self {
            period,
            source,
            flows,
            solar_production: flows.solar_sum(),
            home_consumption: flows.home_sum(),
            grid_import: flows.import_sum(),
            grid_export: flows.export_sum(),
            battery_action: BatteryAction::classify(flows.battery_in(), flows.battery_out()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_actual(&self) -> bool {
        self.source == Source::Actual
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::action::BatteryState;

    #[test]
    fn test_balanced() {
        let flows = EnergyFlows {
            solar_to_home: KilowattHours::from(1.0),
            solar_to_battery: KilowattHours::from(0.5),
            grid_to_home: KilowattHours::from(0.25),
            ..EnergyFlows::default()
        };
        let record = PeriodRecord::balanced(3, Source::Actual, flows);
        assert_abs_diff_eq!(record.solar_production.0, 1.5);
        assert_abs_diff_eq!(record.home_consumption.0, 1.25);
        assert_abs_diff_eq!(record.grid_import.0, 0.25);
        assert_abs_diff_eq!(record.grid_export.0, 0.0);
        assert_eq!(record.battery_action.state, BatteryState::Charging);
        assert!(record.is_actual());
    }
}
