//! BusyScheduleProvider trait definition.
//!
//! The [`BusyScheduleProvider`] trait is the boundary to the external
//! calendar backend: given attendee emails and a date range, it returns each
//! attendee's busy intervals. Failure handling is fail-open at the session
//! layer; providers just report errors.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use meetslot_core::BusyInterval;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};

/// Busy intervals keyed by attendee email, as returned by the backend.
pub type BusyMap = HashMap<String, Vec<BusyInterval>>;

/// The date range a busy-schedule fetch covers, half-open `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRange {
    /// Range start (inclusive).
    pub start: DateTime<Utc>,
    /// Range end (exclusive).
    pub end: DateTime<Utc>,
}

impl FetchRange {
    /// Creates a fetch range.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "FetchRange start must be <= end");
        Self { start, end }
    }

    /// Checks whether a busy interval overlaps this range.
    pub fn covers(&self, interval: &BusyInterval) -> bool {
        interval.overlaps(self.start, self.end)
    }
}

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so providers can be swapped
/// behind `Arc<dyn BusyScheduleProvider>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The boundary to the external busy-schedule source.
///
/// Implementations fetch, for a set of attendee emails and a date range,
/// each attendee's busy intervals. They are expected to be `Send + Sync`;
/// rate limiting, retries, and authentication are internal concerns.
pub trait BusyScheduleProvider: Send + Sync {
    /// Returns the name/type of this provider.
    fn name(&self) -> &str;

    /// Fetches busy intervals for the given emails over the given range.
    ///
    /// Emails unknown to the backend should resolve to empty busy lists,
    /// not errors.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on network, auth, or backend failures.
    fn fetch_busy(
        &self,
        emails: Vec<String>,
        range: FetchRange,
    ) -> BoxFuture<'_, ProviderResult<BusyMap>>;

    /// Returns true when the provider is ready to serve fetches.
    fn is_available(&self) -> bool {
        true
    }
}

/// An in-memory provider backed by fixed busy calendars.
///
/// Used in tests and offline demos. Intervals outside the requested range
/// are filtered out, mirroring what a real free/busy backend returns.
#[derive(Debug, Clone, Default)]
pub struct StaticBusyProvider {
    calendars: BusyMap,
}

impl StaticBusyProvider {
    /// Creates a provider with no busy data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: sets the busy calendar for an email.
    pub fn with_calendar(mut self, email: impl Into<String>, busy: Vec<BusyInterval>) -> Self {
        self.calendars.insert(email.into(), busy);
        self
    }
}

impl BusyScheduleProvider for StaticBusyProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_busy(
        &self,
        emails: Vec<String>,
        range: FetchRange,
    ) -> BoxFuture<'_, ProviderResult<BusyMap>> {
        let result: BusyMap = emails
            .into_iter()
            .map(|email| {
                let busy = self
                    .calendars
                    .get(&email)
                    .map(|intervals| {
                        intervals
                            .iter()
                            .filter(|interval| range.covers(interval))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                (email, busy)
            })
            .collect();
        tracing::debug!(attendees = result.len(), "serving static busy calendars");
        Box::pin(async move { Ok(result) })
    }
}

/// A provider that always fails with a configured error.
///
/// Exercises the fail-open path of the session without a network.
#[derive(Debug)]
pub struct ErrorProvider {
    name: String,
    error: ProviderError,
}

impl ErrorProvider {
    /// Creates a new error provider.
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl BusyScheduleProvider for ErrorProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_busy(
        &self,
        _emails: Vec<String>,
        _range: FetchRange,
    ) -> BoxFuture<'_, ProviderResult<BusyMap>> {
        // ProviderError is not Clone; rebuild it from its parts.
        let error =
            ProviderError::new(self.error.code(), self.error.message()).with_provider(&self.name);
        Box::pin(async move { Err(error) })
    }

    fn is_available(&self) -> bool {
        false
    }
}
