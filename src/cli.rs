use std::path::PathBuf;

use bess_ledger::core::{PeriodGrid, Source};
use clap::{Parser, Subcommand};
use enumset::EnumSet;

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// TOML configuration file, the defaults are used when it does not exist.
    #[clap(long, env = "BESS_LEDGER_CONFIG", default_value = "bess-ledger.toml", global = true)]
    pub config: PathBuf,

    /// Override the configured period grid.
    #[clap(long, env = "BESS_LEDGER_GRID", value_enum, global = true)]
    pub grid: Option<PeriodGrid>,

    /// Print JSON instead of the tables.
    #[clap(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sum the period records and check the energy conservation.
    #[clap(name = "balance")]
    Balance(BalanceArgs),

    /// Complete the device schedule with the default segments.
    #[clap(name = "tou")]
    Tou(TouArgs),

    /// Merge the forecast, the telemetry and the device settings into the display schedule.
    #[clap(name = "schedule")]
    Schedule(Box<ScheduleArgs>),

    /// Compare two forecast snapshots.
    #[clap(name = "compare")]
    Compare(CompareArgs),
}

#[derive(Parser)]
pub struct BalanceArgs {
    /// JSON array of the period records.
    pub periods: PathBuf,

    #[clap(long = "select", value_enum, default_value = "all")]
    pub selection: SelectionArg,
}

#[derive(Copy, Clone, clap::ValueEnum)]
pub enum SelectionArg {
    All,
    Actual,
    Predicted,
}

impl From<SelectionArg> for EnumSet<Source> {
    fn from(selection: SelectionArg) -> Self {
        match selection {
            SelectionArg::All => Self::all(),
            SelectionArg::Actual => Self::only(Source::Actual),
            SelectionArg::Predicted => Self::only(Source::Predicted),
        }
    }
}

#[derive(Parser)]
pub struct TouArgs {
    /// Device report: the segments and, optionally, the per-period controls.
    pub device: PathBuf,
}

#[derive(Parser)]
pub struct ScheduleArgs {
    /// JSON array of the optimizer's period records.
    #[clap(long)]
    pub forecast: PathBuf,

    /// JSON array of the measured period records.
    #[clap(long)]
    pub telemetry: Option<PathBuf>,

    /// Device report.
    #[clap(long)]
    pub device: Option<PathBuf>,

    /// The «current» period, defaults to the one of the local time.
    #[clap(long, env = "REFERENCE_PERIOD")]
    pub reference_period: Option<usize>,
}

#[derive(Parser)]
pub struct CompareArgs {
    /// The earlier snapshot.
    pub a: PathBuf,

    /// The later snapshot.
    pub b: PathBuf,
}
