use serde_json::Value;

use crate::{
    core::{FieldIssue, Reported, Subject, TimeOfDay},
    error::ReconcileError,
    normalize::{
        aliases::{BATTERY_MODE, Concept, END_TIME, ENABLED, SEGMENT_CONCEPTS, SEGMENT_ID, START_TIME},
        fields::Fields,
    },
    prelude::*,
    tou::{interval::{N_SEGMENT_SLOTS, SegmentKind, TouInterval}, mode::BatteryMode},
};

/// Normalize the device-reported segments.
///
/// A segment without an explicit ID takes its slot by the position in the array.
/// A segment reported as `00:00–00:00` is an unused slot.
#[instrument(skip_all)]
pub fn normalize_segments(value: &Value) -> Result<Reported<Vec<TouInterval>>, ReconcileError> {
    let Value::Array(items) = value else {
        return Err(ReconcileError::InvalidRecord {
            position: 0,
            reason: "expected an array of segments".to_owned(),
        });
    };
    let mut warnings = Vec::new();
    let segments = items
        .iter()
        .enumerate()
        .map(|(position, item)| Ok(normalize_segment(position, item)?.drain_into(&mut warnings)))
        .collect::<Result<Vec<_>, ReconcileError>>()?;
    debug!(n_segments = segments.len(), n_warnings = warnings.len(), "normalized");
    Ok(Reported::new(segments, warnings))
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn normalize_segment(
    position: usize,
    value: &Value,
) -> Result<Reported<TouInterval>, ReconcileError> {
    let Value::Object(object) = value else {
        return Err(ReconcileError::InvalidRecord {
            position,
            reason: "expected an object".to_owned(),
        });
    };
    let mut fields = Fields::new(object, Subject::Segment(position));
    fields.check_unrecognized(SEGMENT_CONCEPTS, &[]);

    let segment_id = match fields.number(SEGMENT_ID) {
        None => position as i64 + 1,
        Some(id) if id.fract() == 0.0 => id as i64,
        Some(id) => return Err(ReconcileError::InvalidSegmentId { segment_id: id as i64 }),
    };
    let segment_id = u8::try_from(segment_id)
        .ok()
        .filter(|id| (1..=N_SEGMENT_SLOTS).contains(id))
        .ok_or(ReconcileError::InvalidSegmentId { segment_id })?;

    let start_time = time(&mut fields, START_TIME)?;
    let end_time = time(&mut fields, END_TIME)?;
    let battery_mode = battery_mode(&mut fields);
    let is_enabled = fields.flag(ENABLED).unwrap_or(true);

    let segment = if start_time == TimeOfDay::MIDNIGHT && end_time == TimeOfDay::MIDNIGHT {
        TouInterval { battery_mode, ..TouInterval::empty(segment_id) }
    } else {
        TouInterval {
            segment_id,
            start_time,
            end_time,
            battery_mode,
            is_enabled,
            kind: SegmentKind::Configured,
        }
    };
    Ok(Reported::new(segment, fields.into_warnings()))
}

/// Time of day, defaulting to midnight.
fn time(fields: &mut Fields<'_>, concept: Concept) -> Result<TimeOfDay, ReconcileError> {
    match fields.lookup(concept) {
        None => Ok(TimeOfDay::MIDNIGHT),
        Some((_, Value::String(text))) => text.parse(),
        Some((_, value)) => Err(ReconcileError::InvalidTimeOfDay { value: value.to_string() }),
    }
}

/// Battery mode, defaulting to load-first.
fn battery_mode(fields: &mut Fields<'_>) -> BatteryMode {
    let Some((field, value)) = fields.lookup(BATTERY_MODE) else {
        return BatteryMode::default();
    };
    let mode = match value {
        Value::String(text) => text.parse().ok(),
        Value::Number(number) => number.to_string().parse().ok(),
        _ => None,
    };
    mode.unwrap_or_else(|| {
        fields.warn(FieldIssue::Invalid { field: field.to_owned() });
        BatteryMode::default()
    })
}
