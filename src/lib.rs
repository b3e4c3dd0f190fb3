//! Reconciliation of home battery telemetry, optimizer forecasts, and device schedules into one
//! consistent per-period view.

pub mod action;
pub mod balance;
pub mod config;
pub mod core;
pub mod error;
pub mod normalize;
pub mod prelude;
pub mod quantity;
pub mod schedule;
pub mod snapshot;
pub mod tou;
