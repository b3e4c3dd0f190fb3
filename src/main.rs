mod cli;
mod tables;

use std::{fs, path::Path};

use bess_ledger::{
    balance::aggregate,
    config::Config,
    core::{Reported, TimeOfDay, Warning},
    prelude::*,
    schedule::{DeviceLayer, merge_day, read_device_report},
    snapshot::{Snapshot, compare},
};
use chrono::Local;
use clap::{Parser, crate_version};
use serde::Serialize;
use serde_json::Value;

use crate::{
    cli::{Args, BalanceArgs, Command, CompareArgs, ScheduleArgs, TouArgs},
    tables::{
        build_comparison_table,
        build_coverage_table,
        build_schedule_table,
        build_totals_table,
        build_violations_table,
        build_warnings_table,
    },
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let mut config = Config::read_from(&args.config)?;
    if let Some(grid) = args.grid {
        config.grid = grid;
    }

    match args.command {
        Command::Balance(command) => balance(&config, &command, args.json)?,
        Command::Tou(command) => tou(&config, &command, args.json)?,
        Command::Schedule(command) => schedule(&config, &command, args.json)?,
        Command::Compare(command) => compare_snapshots(&config, &command, args.json)?,
    }

    info!("done!");
    Ok(())
}

#[instrument(skip_all)]
fn balance(config: &Config, args: &BalanceArgs, json: bool) -> Result {
    let Reported { value: records, warnings } =
        config.normalizer().normalize_all(&read_json(&args.periods)?)?;
    let aggregation = aggregate(&records, args.selection.into(), config.balance_tolerance);
    info!(n_records = aggregation.n_records, is_balanced = aggregation.is_balanced(), "aggregated");
    if json {
        return print_json(&Reported::new(aggregation, warnings));
    }
    println!("{}", build_totals_table(&aggregation.totals));
    if !aggregation.is_balanced() {
        println!("{}", build_violations_table(&aggregation.balance_violations));
    }
    print_warnings(&warnings);
    Ok(())
}

#[instrument(skip_all)]
fn tou(config: &Config, args: &TouArgs, json: bool) -> Result {
    let Reported { value: device, warnings } =
        read_device_report(config.grid, &read_json(&args.device)?)?;
    let Some(coverage) = device.coverage else {
        bail!("`{}` reports no schedule segments", args.device.display());
    };
    if json {
        return print_json(&Reported::new(coverage, warnings));
    }
    println!("{}", build_coverage_table(&coverage));
    print_warnings(&warnings);
    Ok(())
}

#[instrument(skip_all)]
fn schedule(config: &Config, args: &ScheduleArgs, json: bool) -> Result {
    let normalizer = config.normalizer();
    let mut warnings = Vec::new();

    let forecast =
        normalizer.normalize_all(&read_json(&args.forecast)?)?.drain_into(&mut warnings);
    let telemetry = match &args.telemetry {
        Some(path) => normalizer.normalize_all(&read_json(path)?)?.drain_into(&mut warnings),
        None => Vec::new(),
    };
    let device = match &args.device {
        Some(path) => {
            read_device_report(config.grid, &read_json(path)?)?.drain_into(&mut warnings)
        }
        None => DeviceLayer::default(),
    };
    let reference_period = match args.reference_period {
        Some(period) => config.grid.check(period)?,
        None => config.grid.period_of(TimeOfDay::from(Local::now().time())),
    };
    info!(reference_period, "merging…");

    let hours = merge_day(&config.merge_context(reference_period), &forecast, &telemetry, &device);
    if json {
        return print_json(&Reported::new(hours, warnings));
    }
    println!("{}", build_schedule_table(&hours));
    print_warnings(&warnings);
    Ok(())
}

#[instrument(skip_all)]
fn compare_snapshots(config: &Config, args: &CompareArgs, json: bool) -> Result {
    let normalizer = config.normalizer();
    let mut warnings = Vec::new();
    let a = Snapshot::from_json(&normalizer, &read_json(&args.a)?)
        .with_context(|| format!("invalid snapshot `{}`", args.a.display()))?
        .drain_into(&mut warnings);
    let b = Snapshot::from_json(&normalizer, &read_json(&args.b)?)
        .with_context(|| format!("invalid snapshot `{}`", args.b.display()))?
        .drain_into(&mut warnings);
    let comparison = compare(&a, &b)?;
    info!(cost_delta = %comparison.totals.delta.cost, "compared");
    if json {
        return print_json(&Reported::new(comparison, warnings));
    }
    println!("{}", build_comparison_table(&comparison));
    print_warnings(&warnings);
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse `{}`", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    for warning in warnings {
        warn!("{warning}");
    }
    println!("{}", build_warnings_table(warnings));
}
