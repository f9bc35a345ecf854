//! The visible calendar month.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use meetslot_providers::FetchRange;
use serde::{Deserialize, Serialize};

/// A calendar month as shown by the booking UI.
///
/// One busy-schedule fetch covers one visible month; the month is half of
/// the fetch cache key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VisibleMonth {
    year: i32,
    month: u32,
}

impl VisibleMonth {
    /// Creates a visible month.
    ///
    /// # Panics
    ///
    /// Panics if `month` is not in `1..=12`.
    pub fn new(year: i32, month: u32) -> Self {
        assert!((1..=12).contains(&month), "month must be in 1..=12");
        Self { year, month }
    }

    /// The month containing the given date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The year component.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month component (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The first date of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("valid first of month")
    }

    /// The following month.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// The preceding month.
    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// Iterates over every date of the month in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let month = *self;
        self.first_day()
            .iter_days()
            .take_while(move |date| VisibleMonth::from_date(*date) == month)
    }

    /// Checks whether a date falls in this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::from_date(date) == *self
    }

    /// The UTC fetch range covering the whole month.
    pub fn fetch_range(&self) -> FetchRange {
        let start = self.first_day().and_hms_opt(0, 0, 0).expect("valid midnight");
        let end = self
            .next()
            .first_day()
            .and_hms_opt(0, 0, 0)
            .expect("valid midnight");
        FetchRange::new(start.and_utc(), end.and_utc())
    }

    /// The first instant of the month in UTC.
    pub fn start_instant(&self) -> DateTime<Utc> {
        self.fetch_range().start
    }
}
