use thiserror::Error;

/// Structural errors: continuing past any of these would silently produce a misleading view.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("snapshot grids differ: {a} periods vs {b} periods")]
    SnapshotGridMismatch { a: usize, b: usize },

    #[error("period {period} is outside of the {n_periods}-period grid")]
    PeriodOutOfRange { period: usize, n_periods: usize },

    #[error("period {period} is reported more than once")]
    DuplicatePeriod { period: usize },

    #[error("period {period} is missing from the grid")]
    MissingPeriod { period: usize },

    #[error("unsupported grid size: {n_periods} periods (expected 24 or 96)")]
    UnsupportedGridSize { n_periods: usize },

    #[error("segment #{segment_id} is outside of the hardware slots 1..=9")]
    InvalidSegmentId { segment_id: i64 },

    #[error("segment #{segment_id} is reported more than once")]
    DuplicateSegment { segment_id: u8 },

    #[error("invalid time of day: `{value}`")]
    InvalidTimeOfDay { value: String },

    #[error("record #{position} is malformed: {reason}")]
    InvalidRecord { position: usize, reason: String },
}
