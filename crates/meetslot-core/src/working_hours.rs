//! Working-hours resolution.
//!
//! This module provides [`WorkingHoursWindow`] (the bookable time-of-day
//! bounds for one date), the [`WorkingHoursResolver`] trait the engine
//! queries per calendar date, and [`WeeklyHours`], a resolver built from a
//! per-weekday pattern with holiday overrides.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The working-hours window for a single calendar date.
///
/// A date with no window (the resolver returns `None`) is a non-working day
/// and produces zero slots. That is a legitimate "closed" state, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHoursWindow {
    /// Start of the bookable window (time of day, inclusive).
    pub start_time: NaiveTime,
    /// End of the bookable window (time of day, exclusive).
    pub end_time: NaiveTime,
}

impl WorkingHoursWindow {
    /// Creates a new working-hours window.
    ///
    /// # Panics
    ///
    /// Panics if `start_time` is not before `end_time`.
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        assert!(
            start_time < end_time,
            "WorkingHoursWindow start must be before end"
        );
        Self {
            start_time,
            end_time,
        }
    }

    /// Creates a window from whole-hour bounds.
    ///
    /// # Panics
    ///
    /// Panics if either hour is out of range or the window is empty.
    pub fn from_hours(start_hour: u32, end_hour: u32) -> Self {
        let start = NaiveTime::from_hms_opt(start_hour, 0, 0).expect("valid start hour");
        let end = NaiveTime::from_hms_opt(end_hour, 0, 0).expect("valid end hour");
        Self::new(start, end)
    }
}

/// Resolves the working-hours window for a calendar date.
///
/// Deterministic per date. Implementations may encode weekday patterns,
/// holidays, or per-client overrides; the engine treats the resolver as an
/// opaque function.
pub trait WorkingHoursResolver {
    /// Returns the window for `date`, or `None` for a non-working day.
    fn resolve(&self, date: NaiveDate) -> Option<WorkingHoursWindow>;
}

impl<F> WorkingHoursResolver for F
where
    F: Fn(NaiveDate) -> Option<WorkingHoursWindow>,
{
    fn resolve(&self, date: NaiveDate) -> Option<WorkingHoursWindow> {
        self(date)
    }
}

/// A resolver built from a per-weekday pattern plus holiday closures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHours {
    /// Window per weekday, indexed Monday = 0. `None` means closed.
    weekdays: [Option<WorkingHoursWindow>; 7],
    /// Dates that are closed regardless of the weekday pattern.
    holidays: BTreeSet<NaiveDate>,
}

impl WeeklyHours {
    /// Creates a resolver with every day closed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a Monday-to-Friday 09:00-17:00 pattern.
    pub fn business_hours() -> Self {
        let window = WorkingHoursWindow::from_hours(9, 17);
        let mut hours = Self::new();
        for weekday in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ] {
            hours = hours.with_weekday(weekday, window);
        }
        hours
    }

    /// Builder: sets the window for a weekday.
    pub fn with_weekday(mut self, weekday: Weekday, window: WorkingHoursWindow) -> Self {
        self.weekdays[weekday.num_days_from_monday() as usize] = Some(window);
        self
    }

    /// Builder: closes a weekday.
    pub fn with_closed_weekday(mut self, weekday: Weekday) -> Self {
        self.weekdays[weekday.num_days_from_monday() as usize] = None;
        self
    }

    /// Builder: marks a specific date as closed.
    pub fn with_holiday(mut self, date: NaiveDate) -> Self {
        self.holidays.insert(date);
        self
    }
}

impl WorkingHoursResolver for WeeklyHours {
    fn resolve(&self, date: NaiveDate) -> Option<WorkingHoursWindow> {
        if self.holidays.contains(&date) {
            return None;
        }
        self.weekdays[date.weekday().num_days_from_monday() as usize]
    }
}
