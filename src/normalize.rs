//! Conversion of loosely-typed period payloads into canonical records.

pub mod aliases;
pub mod fields;

use serde_json::Value;

use self::{aliases::*, fields::Fields};
use crate::{
    action::{ACTION_EPSILON, BatteryAction},
    core::{EnergyFlows, FieldIssue, PeriodGrid, PeriodRecord, Reported, Source, Subject},
    error::ReconcileError,
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours},
};

#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct Normalizer {
    pub grid: PeriodGrid,
    pub action_epsilon: f64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self { grid: PeriodGrid::default(), action_epsilon: ACTION_EPSILON }
    }
}

impl Normalizer {
    pub const fn new(grid: PeriodGrid, action_epsilon: f64) -> Self {
        Self { grid, action_epsilon }
    }

    /// Normalize a JSON array of period payloads.
    ///
    /// A payload without an explicit period takes its position in the array.
    #[instrument(skip_all, fields(grid = ?self.grid))]
    pub fn normalize_all(
        &self,
        value: &Value,
    ) -> Result<Reported<Vec<PeriodRecord>>, ReconcileError> {
        let Value::Array(items) = value else {
            return Err(ReconcileError::InvalidRecord {
                position: 0,
                reason: "expected an array of periods".to_owned(),
            });
        };
        let mut warnings = Vec::new();
        let records = items
            .iter()
            .enumerate()
            .map(|(position, item)| Ok(self.normalize(position, item)?.drain_into(&mut warnings)))
            .collect::<Result<Vec<_>, ReconcileError>>()?;
        debug!(n_records = records.len(), n_warnings = warnings.len(), "normalized");
        Ok(Reported::new(records, warnings))
    }

    /// Normalize one period payload.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn normalize(
        &self,
        position: usize,
        value: &Value,
    ) -> Result<Reported<PeriodRecord>, ReconcileError> {
        let Value::Object(object) = value else {
            return Err(ReconcileError::InvalidRecord {
                position,
                reason: "expected an object".to_owned(),
            });
        };
        let mut fields = Fields::new(object, Subject::Period(position));

        let period = match fields.number(PERIOD) {
            None => position,
            Some(number) if number >= 0.0 && number.fract() == 0.0 => number as usize,
            Some(number) => {
                return Err(ReconcileError::InvalidRecord {
                    position,
                    reason: format!("period `{number}` is not a non-negative integer"),
                });
            }
        };
        let period = self.grid.check(period)?;
        fields.set_subject(Subject::Period(period));
        fields.check_unrecognized(PERIOD_CONCEPTS, IGNORED_PERIOD_FIELDS);

        let source = Self::source(&mut fields);

        let flows = EnergyFlows {
            solar_to_home: fields.flow(SOLAR_TO_HOME).unwrap_or_default(),
            solar_to_battery: fields.flow(SOLAR_TO_BATTERY).unwrap_or_default(),
            solar_to_grid: fields.flow(SOLAR_TO_GRID).unwrap_or_default(),
            grid_to_home: fields.flow(GRID_TO_HOME).unwrap_or_default(),
            grid_to_battery: fields.flow(GRID_TO_BATTERY).unwrap_or_default(),
            battery_to_home: fields.flow(BATTERY_TO_HOME).unwrap_or_default(),
            battery_to_grid: fields.flow(BATTERY_TO_GRID).unwrap_or_default(),
        };

        // Totals which are not reported are accounted by their flows:
        let solar_production = fields.flow(SOLAR_PRODUCTION).unwrap_or_else(|| flows.solar_sum());
        let home_consumption = fields.flow(HOME_CONSUMPTION).unwrap_or_else(|| flows.home_sum());
        let grid_import = fields.flow(GRID_IMPORT).unwrap_or_else(|| flows.import_sum());
        let grid_export = fields.flow(GRID_EXPORT).unwrap_or_else(|| flows.export_sum());

        let cost: Cost = fields.quantity(COST).unwrap_or_default();
        let grid_only_cost: Cost = fields.quantity(GRID_ONLY_COST).unwrap_or_default();
        let savings = fields.quantity(SAVINGS).unwrap_or(grid_only_cost - cost);

        let battery_action = self.battery_action(&mut fields, flows);
        let record = PeriodRecord {
            period,
            source,
            flows,
            solar_production,
            home_consumption,
            grid_import,
            grid_export,
            price: fields.quantity(PRICE).unwrap_or_default(),
            cost,
            grid_only_cost,
            savings,
            battery_soe_end: fields.flow(BATTERY_SOE_END).unwrap_or_default(),
            battery_action,
            strategic_intent: fields.text(STRATEGIC_INTENT).map(str::to_owned),
        };
        Ok(Reported::new(record, fields.into_warnings()))
    }

    /// The record is measured only when it is explicitly marked so.
    fn source(fields: &mut Fields<'_>) -> Source {
        if fields.flag(IS_ACTUAL) == Some(true) {
            return Source::Actual;
        }
        match fields.text(SOURCE).map(str::to_ascii_lowercase).as_deref() {
            Some("actual" | "measured") => Source::Actual,
            None | Some("predicted" | "prediction" | "forecast" | "optimized") => Source::Predicted,
            Some(other) => {
                fields.warn(FieldIssue::Invalid { field: format!("source={other}") });
                Source::Predicted
            }
        }
    }

    /// Prefer the signed action, then the charge/discharge pair, and fall back to the battery flows.
    fn battery_action(&self, fields: &mut Fields<'_>, flows: EnergyFlows) -> BatteryAction {
        if let Some(signed) = fields.quantity::<1, 1, 0>(BATTERY_ACTION) {
            return BatteryAction::from_signed_with(signed, self.action_epsilon);
        }
        let charged: Option<KilowattHours> = fields.flow(BATTERY_CHARGED);
        let discharged: Option<KilowattHours> = fields.flow(BATTERY_DISCHARGED);
        let (charged, discharged) = if charged.is_none() && discharged.is_none() {
            (flows.battery_in(), flows.battery_out())
        } else {
            (charged.unwrap_or_default(), discharged.unwrap_or_default())
        };
        BatteryAction::classify_with(charged, discharged, self.action_epsilon)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    use super::*;
    use crate::{action::BatteryState, core::Warning};

    #[test]
    fn test_legacy_snake_case() -> Result<(), ReconcileError> {
        let payload = json!({
            "hour": 7,
            "solar_generated": 2.0,
            "home_consumed": 1.5,
            "grid_imported": 0.2,
            "grid_exported": 0.5,
            "solar_to_home": 1.3,
            "solar_to_battery": 0.2,
            "solar_to_grid": 0.5,
            "grid_to_home": 0.2,
            "buy_price": 0.8,
            "hourly_cost": 0.16,
            "base_cost": 1.2,
            "battery_soe": 7.5,
            "battery_action": 0.2,
            "strategic_intent": "SOLAR_STORAGE",
        });
        let Reported { value: record, warnings } = Normalizer::default().normalize(0, &payload)?;
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(record.period, 7);
        assert_eq!(record.source, Source::Predicted);
        assert_abs_diff_eq!(record.solar_production.0, 2.0);
        assert_abs_diff_eq!(record.home_consumption.0, 1.5);
        assert_abs_diff_eq!(record.price.0, 0.8);
        assert_abs_diff_eq!(record.savings.0, 1.04, epsilon = 1e-9);
        assert_abs_diff_eq!(record.battery_soe_end.0, 7.5);
        assert_eq!(record.battery_action.state, BatteryState::Charging);
        assert_eq!(record.strategic_intent.as_deref(), Some("SOLAR_STORAGE"));
        Ok(())
    }

    #[test]
    fn test_camel_case_actual() -> Result<(), ReconcileError> {
        let payload = json!({
            "periodIndex": 3,
            "dataSource": "ACTUAL",
            "solarToHome": 0.4,
            "gridToBattery": 2.0,
            "gridToHome": 0.6,
            "savings": -0.1,
        });
        let record = Normalizer::default().normalize(0, &payload)?.value;
        assert_eq!(record.period, 3);
        assert!(record.is_actual());
        assert_abs_diff_eq!(record.solar_production.0, 0.4);
        assert_abs_diff_eq!(record.home_consumption.0, 1.0);
        assert_abs_diff_eq!(record.grid_import.0, 2.6, epsilon = 1e-9);
        assert_abs_diff_eq!(record.savings.0, -0.1);
        assert_eq!(record.battery_action.state, BatteryState::Charging);
        assert_abs_diff_eq!(record.battery_action.signed.0, 2.0);
        Ok(())
    }

    #[test]
    fn test_is_actual_flag() -> Result<(), ReconcileError> {
        let record = Normalizer::default().normalize(2, &json!({"isActual": true}))?.value;
        assert_eq!(record.period, 2);
        assert_eq!(record.source, Source::Actual);
        Ok(())
    }

    #[test]
    fn test_missing_fields_default() -> Result<(), ReconcileError> {
        let Reported { value: record, warnings } = Normalizer::default().normalize(4, &json!({}))?;
        assert!(warnings.is_empty());
        assert_eq!(record, PeriodRecord { period: 4, ..PeriodRecord::default() });
        Ok(())
    }

    #[test]
    fn test_charge_discharge_pair() -> Result<(), ReconcileError> {
        let payload = json!({"chargePower": 0.0, "dischargePower": 1.5});
        let record = Normalizer::default().normalize(0, &payload)?.value;
        assert_eq!(record.battery_action.state, BatteryState::Discharging);
        assert_abs_diff_eq!(record.battery_action.signed.0, -1.5);
        Ok(())
    }

    #[test]
    fn test_unrecognized_and_conflicting_are_warnings() -> Result<(), ReconcileError> {
        let payload = json!({"period": 1, "solarGenerated": 1.0, "solar_generated": 2.0, "foo": 1});
        let Reported { value: record, warnings } = Normalizer::default().normalize(0, &payload)?;
        assert_abs_diff_eq!(record.solar_production.0, 0.0);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|warning| matches!(
            warning,
            Warning::Field { subject: Subject::Period(1), .. }
        )));
        Ok(())
    }

    #[test]
    fn test_period_out_of_range() {
        assert_eq!(
            Normalizer::default().normalize(0, &json!({"period": 24})).unwrap_err(),
            ReconcileError::PeriodOutOfRange { period: 24, n_periods: 24 },
        );
        let normalizer = Normalizer::new(PeriodGrid::QuarterHourly, ACTION_EPSILON);
        assert!(normalizer.normalize(0, &json!({"period": 95})).is_ok());
    }

    #[test]
    fn test_fractional_period() {
        assert!(matches!(
            Normalizer::default().normalize(0, &json!({"period": 1.5})),
            Err(ReconcileError::InvalidRecord { position: 0, .. }),
        ));
    }

    #[test]
    fn test_normalize_all_positions() -> Result<(), ReconcileError> {
        let payload = json!([{"solar": 1.0}, {"solar": 2.0}, {"period": 23}]);
        let records = Normalizer::default().normalize_all(&payload)?.value;
        assert_eq!(records.iter().map(|record| record.period).collect::<Vec<_>>(), [0, 1, 23]);
        Ok(())
    }

    #[test]
    fn test_normalize_all_rejects_non_array() {
        assert!(Normalizer::default().normalize_all(&json!({"period": 1})).is_err());
    }
}
