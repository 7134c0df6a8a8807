//! Conversion of daily "HH:MM" windows between the stored UTC form and a
//! viewer's local wall clock.
//!
//! These functions sit at the storage/UI boundary. The condition evaluator
//! only ever receives windows that have already passed through here.

use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta};
use hunt_types::{Condition, ConditionKind, HuntError};

pub const CLOCK_FORMAT: &str = "%H:%M";

/// Parse a zero-padded "HH:MM" clock time.
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, HuntError> {
    let invalid = || HuntError::InvalidTimeWindow {
        value: value.to_string(),
    };

    if value.len() != 5 {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(value, CLOCK_FORMAT).map_err(|_| invalid())
}

pub fn format_clock_time(time: NaiveTime) -> String {
    time.format(CLOCK_FORMAT).to_string()
}

/// The viewer's local "HH:MM" at the given instant.
pub fn local_clock(now: &DateTime<FixedOffset>) -> String {
    now.format(CLOCK_FORMAT).to_string()
}

fn shift(value: &str, seconds: i32) -> Result<String, HuntError> {
    let time = parse_clock_time(value)?;
    let (shifted, _) = time.overflowing_add_signed(TimeDelta::seconds(seconds as i64));
    Ok(format_clock_time(shifted))
}

pub fn utc_to_local(value: &str, offset: FixedOffset) -> Result<String, HuntError> {
    shift(value, offset.local_minus_utc())
}

pub fn local_to_utc(value: &str, offset: FixedOffset) -> Result<String, HuntError> {
    shift(value, -offset.local_minus_utc())
}

fn convert_kind(
    kind: &ConditionKind,
    convert: impl Fn(&str) -> Result<String, HuntError>,
) -> Result<ConditionKind, HuntError> {
    match kind {
        ConditionKind::RequiredLocation { .. } => Ok(kind.clone()),
        ConditionKind::TimeWindow { start, end } => Ok(ConditionKind::TimeWindow {
            start: convert(start)?,
            end: convert(end)?,
        }),
    }
}

/// Convert a window authored on the owner's local clock into its stored UTC form.
pub fn kind_to_utc(kind: &ConditionKind, offset: FixedOffset) -> Result<ConditionKind, HuntError> {
    convert_kind(kind, |value| local_to_utc(value, offset))
}

pub fn kind_to_local(kind: &ConditionKind, offset: FixedOffset) -> Result<ConditionKind, HuntError> {
    convert_kind(kind, |value| utc_to_local(value, offset))
}

/// Rewrite stored (UTC) conditions onto the viewer's local clock.
pub fn localize_conditions(
    conditions: &[Condition],
    offset: FixedOffset,
) -> Result<Vec<Condition>, HuntError> {
    conditions
        .iter()
        .map(|condition| {
            Ok(Condition {
                id: condition.id,
                checkpoint_id: condition.checkpoint_id,
                kind: kind_to_local(&condition.kind, offset)?,
            })
        })
        .collect()
}
