//! Historical field names of the same concepts.

/// One concept of a loosely-typed payload: the canonical field name and its legacy aliases.
#[derive(Copy, Clone, Debug)]
pub struct Concept {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

impl Concept {
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.canonical).chain(self.aliases.iter().copied())
    }
}

macro_rules! concept {
    ($name:ident, $canonical:literal $(, $alias:literal)* $(,)?) => {
        pub const $name: Concept = Concept { canonical: $canonical, aliases: &[$($alias),*] };
    };
}

concept!(PERIOD, "period", "periodIndex", "period_index", "hour", "index");
concept!(SOURCE, "source", "data_source", "dataSource");
concept!(IS_ACTUAL, "is_actual", "isActual");

concept!(
    SOLAR_PRODUCTION,
    "solar_production",
    "solarProduction",
    "solar_generated",
    "solarGenerated",
    "solar_production_kwh",
    "solar",
);
concept!(
    HOME_CONSUMPTION,
    "home_consumption",
    "homeConsumption",
    "home_consumed",
    "homeConsumed",
    "consumption",
);
concept!(GRID_IMPORT, "grid_import", "gridImport", "grid_imported", "gridImported", "import_from_grid");
concept!(GRID_EXPORT, "grid_export", "gridExport", "grid_exported", "gridExported", "export_to_grid");

concept!(SOLAR_TO_HOME, "solar_to_home", "solarToHome");
concept!(SOLAR_TO_BATTERY, "solar_to_battery", "solarToBattery");
concept!(SOLAR_TO_GRID, "solar_to_grid", "solarToGrid");
concept!(GRID_TO_HOME, "grid_to_home", "gridToHome");
concept!(GRID_TO_BATTERY, "grid_to_battery", "gridToBattery");
concept!(BATTERY_TO_HOME, "battery_to_home", "batteryToHome");
concept!(BATTERY_TO_GRID, "battery_to_grid", "batteryToGrid");

concept!(PRICE, "price", "buy_price", "buyPrice", "electricity_price", "electricityPrice");
concept!(COST, "cost", "hourly_cost", "hourlyCost", "battery_solar_cost", "batterySolarCost");
concept!(GRID_ONLY_COST, "grid_only_cost", "gridOnlyCost", "base_cost", "baseCost");
concept!(SAVINGS, "savings", "hourly_savings", "hourlySavings");
concept!(BATTERY_SOE_END, "battery_soe_end", "batterySoeEnd", "battery_soe", "batterySoe", "soe_end");

concept!(BATTERY_ACTION, "battery_action", "batteryAction", "action");
concept!(BATTERY_CHARGED, "battery_charged", "batteryCharged", "charge_power", "chargePower");
concept!(
    BATTERY_DISCHARGED,
    "battery_discharged",
    "batteryDischarged",
    "discharge_power",
    "dischargePower",
);
concept!(STRATEGIC_INTENT, "strategic_intent", "strategicIntent", "intent");

/// Every concept of a period payload.
pub const PERIOD_CONCEPTS: &[Concept] = &[
    PERIOD,
    SOURCE,
    IS_ACTUAL,
    SOLAR_PRODUCTION,
    HOME_CONSUMPTION,
    GRID_IMPORT,
    GRID_EXPORT,
    SOLAR_TO_HOME,
    SOLAR_TO_BATTERY,
    SOLAR_TO_GRID,
    GRID_TO_HOME,
    GRID_TO_BATTERY,
    BATTERY_TO_HOME,
    BATTERY_TO_GRID,
    PRICE,
    COST,
    GRID_ONLY_COST,
    SAVINGS,
    BATTERY_SOE_END,
    BATTERY_ACTION,
    BATTERY_CHARGED,
    BATTERY_DISCHARGED,
    STRATEGIC_INTENT,
];

/// Known display-only fields that carry nothing for the reconciliation.
pub const IGNORED_PERIOD_FIELDS: &[&str] =
    &["timestamp", "start_time", "startTime", "date", "is_current", "isCurrent"];

concept!(SEGMENT_ID, "segment_id", "segmentId", "id");
concept!(START_TIME, "start_time", "startTime", "start");
concept!(END_TIME, "end_time", "endTime", "end");
concept!(BATTERY_MODE, "battery_mode", "batteryMode", "batt_mode", "battMode", "mode");
concept!(ENABLED, "enabled", "enable", "is_enabled", "isEnabled");

/// Every concept of a device segment payload.
pub const SEGMENT_CONCEPTS: &[Concept] = &[SEGMENT_ID, START_TIME, END_TIME, BATTERY_MODE, ENABLED];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_names_are_unique() {
        for concepts in [PERIOD_CONCEPTS, SEGMENT_CONCEPTS] {
            let mut seen = HashSet::new();
            for name in concepts.iter().flat_map(|concept| concept.names()) {
                assert!(seen.insert(name), "`{name}` is claimed twice");
            }
        }
    }

    #[test]
    fn test_ignored_fields_are_not_concepts() {
        let names: HashSet<_> = PERIOD_CONCEPTS.iter().flat_map(|concept| concept.names()).collect();
        assert!(IGNORED_PERIOD_FIELDS.iter().all(|field| !names.contains(field)));
    }
}
