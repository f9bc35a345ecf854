//! Interval types for the availability engine.
//!
//! This module provides [`BusyInterval`] for externally-sourced calendar
//! commitments. Intervals are half-open `[start, end)` in UTC, which lets a
//! meeting be booked to start the instant a prior one ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time range during which an attendee is already committed.
///
/// Half-open interval `[start, end)` in UTC. The source of truth is the
/// external calendar provider; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    /// Start of the commitment (inclusive).
    pub start: DateTime<Utc>,
    /// End of the commitment (exclusive).
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    /// Creates a new busy interval.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "BusyInterval start must be <= end");
        Self { start, end }
    }

    /// Creates a busy interval from a start time and duration.
    pub fn from_duration(start: DateTime<Utc>, duration: chrono::Duration) -> Self {
        Self::new(start, start + duration)
    }

    /// Returns the duration of this interval.
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Checks whether this interval overlaps the candidate range `[start, end)`.
    ///
    /// Uses strict open overlap semantics: a busy interval that ends exactly
    /// when the candidate starts (or starts exactly when the candidate ends)
    /// does not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }

    /// Checks whether this interval intersects another busy interval.
    pub fn intersects(&self, other: &BusyInterval) -> bool {
        self.overlaps(other.start, other.end)
    }
}
