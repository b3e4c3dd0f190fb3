//! Completion of a sparse device schedule into a gap-free day.

pub mod interval;
pub mod mode;
pub mod segments;

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::Serialize;

pub use self::{
    interval::{DEFAULT_SEGMENT_ID, N_SEGMENT_SLOTS, SegmentKind, TouInterval},
    mode::BatteryMode,
    segments::normalize_segments,
};
use crate::{
    core::{PeriodGrid, Reported, Warning},
    error::ReconcileError,
    prelude::*,
};

/// Complete device schedule of a day: every hardware slot plus the synthesized defaults.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TouCoverage {
    pub grid: PeriodGrid,

    /// Sorted by the start time, then by the kind, then by the segment ID.
    pub intervals: Vec<TouInterval>,
}

impl TouCoverage {
    pub fn configured(&self) -> impl Iterator<Item = &TouInterval> {
        self.intervals.iter().filter(|interval| interval.is_configured())
    }

    pub fn defaults(&self) -> impl Iterator<Item = &TouInterval> {
        self.intervals.iter().filter(|interval| interval.kind == SegmentKind::Default)
    }

    /// Interval governing the period.
    ///
    /// Enabled configured segments take precedence over the defaults, and among overlapping
    /// segments the highest ID wins.
    #[must_use]
    pub fn lookup(&self, period: usize) -> Option<&TouInterval> {
        let span = self.grid.minute_span(period);
        self.configured()
            .filter(|interval| interval.is_enabled && interval.touches(&span))
            .max_by_key(|interval| interval.segment_id)
            .or_else(|| self.defaults().find(|interval| interval.touches(&span)))
    }
}

/// Fill the time not covered by the enabled configured segments with load-first defaults.
///
/// Only the configured segments and the empty slots are taken from the input: previously
/// synthesized defaults are ignored and rebuilt, so that filling an already filled schedule
/// changes nothing.
#[instrument(skip_all, fields(grid = ?grid, n_segments = segments.len()))]
pub fn fill_gaps(
    grid: PeriodGrid,
    segments: &[TouInterval],
) -> Result<Reported<TouCoverage>, ReconcileError> {
    let mut slots = BTreeMap::new();
    for segment in segments.iter().filter(|segment| segment.kind != SegmentKind::Default) {
        if !(1..=N_SEGMENT_SLOTS).contains(&segment.segment_id) {
            return Err(ReconcileError::InvalidSegmentId {
                segment_id: i64::from(segment.segment_id),
            });
        }
        if slots.insert(segment.segment_id, *segment).is_some() {
            return Err(ReconcileError::DuplicateSegment { segment_id: segment.segment_id });
        }
    }

    let warnings: Vec<_> = slots
        .values()
        .filter(|segment| segment.is_configured() && segment.is_enabled)
        .tuple_combinations()
        .filter(|(first, second)| first.overlaps(second))
        .map(|(first, second)| Warning::OverlappingSegments {
            first: first.segment_id,
            second: second.segment_id,
        })
        .collect();

    let is_covered: Vec<bool> = grid
        .periods()
        .map(|period| {
            slots.values().any(|segment| {
                segment.is_configured()
                    && segment.is_enabled
                    && segment.touches_period(grid, period)
            })
        })
        .collect();
    let defaults: Vec<_> = grid
        .periods()
        .chunk_by(|period| is_covered[*period])
        .into_iter()
        .filter(|(covered, _)| !covered)
        .filter_map(|(_, mut run)| {
            let first = run.next()?;
            let last = run.last().unwrap_or(first);
            Some(TouInterval::default_for(grid, first, last))
        })
        .collect();

    let intervals: Vec<_> = (1..=N_SEGMENT_SLOTS)
        .map(|segment_id| {
            slots.get(&segment_id).copied().unwrap_or_else(|| TouInterval::empty(segment_id))
        })
        .chain(defaults)
        .sorted_by_key(|interval| (interval.start_time, interval.kind, interval.segment_id))
        .collect();
    debug!(
        n_configured = intervals.iter().filter(|interval| interval.is_configured()).count(),
        n_intervals = intervals.len(),
        n_overlaps = warnings.len(),
        "filled the gaps",
    );
    Ok(Reported::new(TouCoverage { grid, intervals }, warnings))
}

#[cfg(test)]
pub(crate) mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::core::TimeOfDay;

    fn time(hour: u8, minute: u8) -> TimeOfDay {
        TimeOfDay::new(hour, minute).unwrap()
    }

    #[test]
    fn test_morning_and_evening() -> Result<(), ReconcileError> {
        let configured = [
            TouInterval::configured(1, time(6, 0), time(9, 0), BatteryMode::BatteryFirst),
            TouInterval::configured(2, time(17, 0), time(20, 0), BatteryMode::GridFirst),
        ];
        let Reported { value: coverage, warnings } = fill_gaps(PeriodGrid::Hourly, &configured)?;
        assert!(warnings.is_empty());

        let defaults: Vec<_> = coverage
            .defaults()
            .map(|interval| (interval.start_time, interval.end_time, interval.battery_mode))
            .collect();
        assert_eq!(
            defaults,
            [
                (time(0, 0), time(5, 59), BatteryMode::LoadFirst),
                (time(9, 0), time(16, 59), BatteryMode::LoadFirst),
                (time(20, 0), time(23, 59), BatteryMode::LoadFirst),
            ],
        );
        assert_eq!(coverage.configured().copied().collect::<Vec<_>>(), configured);

        let empty: Vec<_> = coverage
            .intervals
            .iter()
            .filter(|interval| interval.kind == SegmentKind::Empty)
            .map(|interval| interval.segment_id)
            .collect();
        assert_eq!(empty, [3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(coverage.intervals.len(), 12);
        assert!(coverage.intervals.iter().is_sorted_by_key(|interval| {
            (interval.start_time, interval.kind, interval.segment_id)
        }));
        Ok(())
    }

    #[test]
    fn test_nothing_configured() -> Result<(), ReconcileError> {
        let coverage = fill_gaps(PeriodGrid::QuarterHourly, &[])?.value;
        let defaults: Vec<_> = coverage.defaults().collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].start_time, TimeOfDay::MIDNIGHT);
        assert_eq!(defaults[0].end_time, TimeOfDay::END_OF_DAY);
        assert_eq!(defaults[0].segment_id, DEFAULT_SEGMENT_ID);
        assert_eq!(coverage.intervals.len(), 10);
        Ok(())
    }

    #[test]
    fn test_quarter_hourly_defaults() -> Result<(), ReconcileError> {
        let configured =
            [TouInterval::configured(1, time(6, 15), time(6, 45), BatteryMode::BatteryFirst)];
        let coverage = fill_gaps(PeriodGrid::QuarterHourly, &configured)?.value;
        let defaults: Vec<_> =
            coverage.defaults().map(|interval| (interval.start_time, interval.end_time)).collect();
        assert_eq!(defaults, [(time(0, 0), time(6, 14)), (time(6, 45), time(23, 59))]);
        Ok(())
    }

    #[test]
    fn test_disabled_does_not_cover() -> Result<(), ReconcileError> {
        let configured = [TouInterval {
            is_enabled: false,
            ..TouInterval::configured(4, time(1, 0), time(2, 0), BatteryMode::GridFirst)
        }];
        let coverage = fill_gaps(PeriodGrid::Hourly, &configured)?.value;
        assert_eq!(coverage.defaults().count(), 1);
        assert_eq!(coverage.configured().count(), 1);
        assert_eq!(coverage.lookup(1).map(|interval| interval.kind), Some(SegmentKind::Default));
        Ok(())
    }

    #[test]
    fn test_wrapping_segment() -> Result<(), ReconcileError> {
        let configured =
            [TouInterval::configured(1, time(22, 0), time(2, 0), BatteryMode::BatteryFirst)];
        let coverage = fill_gaps(PeriodGrid::Hourly, &configured)?.value;
        let defaults: Vec<_> =
            coverage.defaults().map(|interval| (interval.start_time, interval.end_time)).collect();
        assert_eq!(defaults, [(time(2, 0), time(21, 59))]);
        assert_eq!(coverage.lookup(23).map(|interval| interval.segment_id), Some(1));
        assert_eq!(coverage.lookup(0).map(|interval| interval.segment_id), Some(1));
        Ok(())
    }

    #[test]
    fn test_overlap() -> Result<(), ReconcileError> {
        let configured = [
            TouInterval::configured(2, time(6, 0), time(10, 0), BatteryMode::GridFirst),
            TouInterval::configured(1, time(8, 0), time(12, 0), BatteryMode::BatteryFirst),
        ];
        let Reported { value: coverage, warnings } = fill_gaps(PeriodGrid::Hourly, &configured)?;
        assert_eq!(warnings, [Warning::OverlappingSegments { first: 1, second: 2 }]);
        assert_eq!(coverage.lookup(7).map(|interval| interval.segment_id), Some(2));
        assert_eq!(coverage.lookup(9).map(|interval| interval.segment_id), Some(2));
        assert_eq!(coverage.lookup(11).map(|interval| interval.segment_id), Some(1));
        assert_eq!(coverage.lookup(12).map(|interval| interval.kind), Some(SegmentKind::Default));
        Ok(())
    }

    #[test]
    fn test_invalid_segments() {
        let segment = TouInterval::configured(1, time(1, 0), time(2, 0), BatteryMode::LoadFirst);
        assert_eq!(
            fill_gaps(PeriodGrid::Hourly, &[segment, segment]).unwrap_err(),
            ReconcileError::DuplicateSegment { segment_id: 1 },
        );
        assert_eq!(
            fill_gaps(PeriodGrid::Hourly, &[TouInterval { segment_id: 10, ..segment }])
                .unwrap_err(),
            ReconcileError::InvalidSegmentId { segment_id: 10 },
        );
    }

    /// Non-overlapping hour-aligned segments, built from sorted boundaries.
    pub(crate) fn hour_aligned() -> impl Strategy<Value = Vec<TouInterval>> {
        prop::collection::btree_set(0_u8..=24, 0..=18).prop_map(|boundaries| {
            boundaries
                .into_iter()
                .tuples()
                .zip(1..=N_SEGMENT_SLOTS)
                .map(|((start, end), segment_id)| {
                    let end_time = if end == 24 { TimeOfDay::END_OF_DAY } else { time(end, 0) };
                    TouInterval::configured(
                        segment_id,
                        time(start, 0),
                        end_time,
                        BatteryMode::BatteryFirst,
                    )
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn union_covers_the_day_exactly(segments in hour_aligned()) {
            let Reported { value: coverage, warnings } =
                fill_gaps(PeriodGrid::Hourly, &segments).unwrap();
            prop_assert!(warnings.is_empty());
            for period in PeriodGrid::Hourly.periods() {
                let n_governing = coverage
                    .intervals
                    .iter()
                    .filter(|interval| interval.is_active())
                    .filter(|interval| interval.touches_period(PeriodGrid::Hourly, period))
                    .count();
                prop_assert_eq!(n_governing, 1, "period {}", period);
            }
            for default in coverage.defaults() {
                prop_assert!(coverage.configured().all(|configured| !configured.overlaps(default)));
            }
        }

        #[test]
        fn filling_is_idempotent(segments in hour_aligned()) {
            let once = fill_gaps(PeriodGrid::Hourly, &segments).unwrap().value;
            let twice = fill_gaps(PeriodGrid::Hourly, &once.intervals).unwrap().value;
            prop_assert_eq!(&once, &twice);

            let configured: Vec<_> = once.configured().copied().collect();
            let again = fill_gaps(PeriodGrid::Hourly, &configured).unwrap().value;
            prop_assert_eq!(
                once.defaults().collect::<Vec<_>>(),
                again.defaults().collect::<Vec<_>>(),
            );
        }
    }
}
