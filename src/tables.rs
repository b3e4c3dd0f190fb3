use bess_ledger::{
    action::DisplayAction,
    balance::{AggregateTotals, BalanceViolation},
    core::{Source, Warning},
    quantity::{cost::Cost, energy::KilowattHours},
    schedule::{PeriodTiming, ScheduleHour},
    snapshot::SnapshotComparison,
    tou::{SegmentKind, TouCoverage},
};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn energy_cell(energy: KilowattHours) -> Cell {
    Cell::new(energy).set_alignment(CellAlignment::Right)
}

/// Green for the money saved, red for the money spent.
fn cost_delta_cell(delta: Cost) -> Cell {
    Cell::new(delta).set_alignment(CellAlignment::Right).fg(if delta >= Cost::ONE_CENT {
        Color::Red
    } else if delta <= -Cost::ONE_CENT {
        Color::Green
    } else {
        Color::Reset
    })
}

const fn action_color(action: DisplayAction) -> Color {
    match action {
        DisplayAction::Charge => Color::Green,
        DisplayAction::Discharge => Color::Red,
        DisplayAction::Idle => Color::Reset,
    }
}

#[must_use]
pub fn build_totals_table(totals: &AggregateTotals) -> Table {
    let mut table = new_table();
    table.set_header(vec!["", "Total"]);
    let rows = [
        ("Solar production", totals.solar_production),
        ("Home consumption", totals.home_consumption),
        ("Grid import", totals.grid_import),
        ("Grid export", totals.grid_export),
        ("Battery charged", totals.battery_charged),
        ("Battery discharged", totals.battery_discharged),
    ];
    for (title, energy) in rows {
        table.add_row(vec![Cell::new(title), energy_cell(energy)]);
    }
    let costs = [
        ("Cost", totals.cost),
        ("Grid-only cost", totals.grid_only_cost),
        ("Savings", totals.savings),
    ];
    for (title, cost) in costs {
        table.add_row(vec![Cell::new(title), Cell::new(cost).set_alignment(CellAlignment::Right)]);
    }
    table
}

#[must_use]
pub fn build_violations_table(violations: &[BalanceViolation]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Period", "Invariant", "Flows", "Reported", "Delta"]);
    for violation in violations {
        table.add_row(vec![
            Cell::new(violation.period).set_alignment(CellAlignment::Right),
            Cell::new(violation.invariant),
            energy_cell(violation.expected),
            energy_cell(violation.actual),
            energy_cell(violation.delta).fg(Color::Red),
        ]);
    }
    table
}

#[must_use]
pub fn build_warnings_table(warnings: &[Warning]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Warning"]);
    for warning in warnings {
        table.add_row(vec![Cell::new(warning).fg(Color::DarkYellow)]);
    }
    table
}

#[must_use]
pub fn build_coverage_table(coverage: &TouCoverage) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Segment", "Start", "End", "Mode", "Enabled", "Kind"]);
    for interval in &coverage.intervals {
        let is_dim = interval.kind == SegmentKind::Empty || !interval.is_enabled;
        let mut row = vec![
            Cell::new(interval.segment_id).set_alignment(CellAlignment::Right),
            Cell::new(interval.start_time),
            Cell::new(interval.end_time),
            Cell::new(interval.battery_mode).fg(interval.battery_mode.color()),
            Cell::new(if interval.is_enabled { "yes" } else { "no" }),
            Cell::new(format!("{:?}", interval.kind)),
        ];
        if is_dim {
            row = row.into_iter().map(|cell| cell.add_attribute(Attribute::Dim)).collect();
        }
        table.add_row(row);
    }
    table
}

#[must_use]
pub fn build_schedule_table(hours: &[ScheduleHour]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Start",
        "Intent",
        "Action",
        "Energy",
        "Source",
        "Mode",
        "Grid charge",
        "Charge rate",
        "Discharge rate",
        "Segment",
    ]);
    for hour in hours {
        let start = Cell::new(hour.start_time);
        table.add_row(vec![
            match hour.timing {
                PeriodTiming::Past => start.add_attribute(Attribute::Dim),
                PeriodTiming::Current => start.add_attribute(Attribute::Bold),
                PeriodTiming::Future => start,
            },
            Cell::new(&hour.strategic_intent),
            Cell::new(hour.display_action).fg(action_color(hour.display_action)),
            energy_cell(hour.battery_action),
            Cell::new(match hour.data_source {
                Source::Actual => "actual",
                Source::Predicted => "predicted",
            }),
            Cell::new(hour.battery_mode).fg(hour.battery_mode.color()),
            Cell::new(if hour.grid_charge_enabled { "yes" } else { "no" }),
            Cell::new(hour.charge_power_rate).set_alignment(CellAlignment::Right),
            Cell::new(hour.discharge_power_rate).set_alignment(CellAlignment::Right),
            hour.tou.map_or_else(
                || Cell::new("not configured").add_attribute(Attribute::Dim),
                |interval| Cell::new(format!("#{} {:?}", interval.segment_id, interval.kind)),
            ),
        ]);
    }
    table
}

#[must_use]
pub fn build_comparison_table(comparison: &SnapshotComparison) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Start",
        "Cost A",
        "Cost B",
        "Δ Cost",
        "Δ Savings",
        "Δ Import",
        "Δ Export",
        "Δ Battery",
        "Δ SoE",
    ]);
    for period in &comparison.period_comparisons {
        let is_largest = comparison.largest_cost_change == Some(period.period);
        let start = Cell::new(comparison.grid.period_start(period.period));
        table.add_row(vec![
            if is_largest { start.add_attribute(Attribute::Bold) } else { start },
            Cell::new(period.values_a.totals.cost).set_alignment(CellAlignment::Right),
            Cell::new(period.values_b.totals.cost).set_alignment(CellAlignment::Right),
            cost_delta_cell(period.delta.totals.cost),
            Cell::new(period.delta.totals.savings).set_alignment(CellAlignment::Right),
            energy_cell(period.delta.totals.grid_import),
            energy_cell(period.delta.totals.grid_export),
            energy_cell(period.delta.totals.battery_net),
            energy_cell(period.delta.battery_soe_end),
        ]);
    }
    let totals = &comparison.totals;
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(totals.a.cost).set_alignment(CellAlignment::Right),
        Cell::new(totals.b.cost).set_alignment(CellAlignment::Right),
        cost_delta_cell(totals.delta.cost),
        Cell::new(totals.delta.savings).set_alignment(CellAlignment::Right),
        energy_cell(totals.delta.grid_import),
        energy_cell(totals.delta.grid_export),
        energy_cell(totals.delta.battery_net),
        Cell::new(""),
    ]);
    table
}
