//! Scheduling policy configuration.
//!
//! The policy is a read-only configuration record: minimum notice before a
//! same-day booking, the advance-booking horizon, and the meeting duration.
//! Validation happens at configuration load; the slot generator assumes a
//! validated policy.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Meeting durations the booking flow offers.
pub const ALLOWED_DURATIONS_MINUTES: [i64; 5] = [15, 30, 45, 60, 90];

/// Errors from scheduling-policy validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Minimum notice must be a positive number of hours.
    #[error("minimum notice hours must be positive, got {0}")]
    NonPositiveNotice(i64),
    /// The advance-booking horizon must be a positive number of days.
    #[error("max advance days must be positive, got {0}")]
    NonPositiveHorizon(i64),
    /// Duration must be one of the offered values.
    #[error("duration {0} minutes is not one of the offered durations")]
    InvalidDuration(i64),
}

/// The active scheduling policy for one booking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingPolicy {
    /// Minimum lead time before "now" for same-day bookings, in hours.
    pub min_notice_hours: i64,
    /// How far into the future a date may be booked, in days.
    pub max_advance_days: i64,
    /// Length of the meeting to book, in minutes.
    pub duration_minutes: i64,
}

impl Default for SchedulingPolicy {
    /// The fallback policy used verbatim when the remote policy store is
    /// unreachable. Duration is normally caller-selected; 30 minutes is the
    /// flow's initial selection.
    fn default() -> Self {
        Self {
            min_notice_hours: 4,
            max_advance_days: 60,
            duration_minutes: 30,
        }
    }
}

impl SchedulingPolicy {
    /// Creates a policy with the default notice and horizon and the given
    /// caller-selected duration.
    pub fn with_duration(duration_minutes: i64) -> Self {
        Self {
            duration_minutes,
            ..Default::default()
        }
    }

    /// Validates the policy.
    ///
    /// Non-positive notice, horizon, or duration is rejected here rather
    /// than deep inside slot generation, as is a duration outside the
    /// offered menu.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.min_notice_hours <= 0 {
            return Err(PolicyError::NonPositiveNotice(self.min_notice_hours));
        }
        if self.max_advance_days <= 0 {
            return Err(PolicyError::NonPositiveHorizon(self.max_advance_days));
        }
        if !ALLOWED_DURATIONS_MINUTES.contains(&self.duration_minutes) {
            return Err(PolicyError::InvalidDuration(self.duration_minutes));
        }
        Ok(())
    }

    /// Consumes and returns the policy if valid.
    pub fn validated(self) -> Result<Self, PolicyError> {
        self.validate()?;
        Ok(self)
    }

    /// The meeting duration as a [`chrono::Duration`].
    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }

    /// The minimum notice as a [`chrono::Duration`].
    pub fn notice(&self) -> Duration {
        Duration::hours(self.min_notice_hours)
    }

    /// Checks whether `date` falls within the bookable horizon starting at
    /// `today`: `[today, today + max_advance_days]`.
    pub fn within_horizon(&self, today: NaiveDate, date: NaiveDate) -> bool {
        date >= today && date <= today + Duration::days(self.max_advance_days)
    }
}
