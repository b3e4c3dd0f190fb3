pub mod grid;
pub mod period;
pub mod time_of_day;
pub mod warning;

pub use self::{
    grid::PeriodGrid,
    period::{EnergyFlows, PeriodRecord, Source},
    time_of_day::TimeOfDay,
    warning::{FieldIssue, Reported, Subject, Warning},
};
