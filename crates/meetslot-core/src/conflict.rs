//! Conflict evaluation between a candidate slot and a busy calendar.

use chrono::{DateTime, Utc};

use crate::time::BusyInterval;

/// Tests whether the candidate range `[start, end)` overlaps any busy interval.
///
/// This is a strict open overlap test: a busy interval ending exactly at the
/// candidate's start, or starting exactly at the candidate's end, is not a
/// conflict. Pure function, no side effects.
pub fn conflicts(start: DateTime<Utc>, end: DateTime<Utc>, busy: &[BusyInterval]) -> bool {
    busy.iter().any(|interval| interval.overlaps(start, end))
}
