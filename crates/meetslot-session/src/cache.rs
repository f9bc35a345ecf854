//! Cached busy data and derived-digest keys.
//!
//! The session holds exactly one busy-data value at a time, replaced
//! atomically when a fetch for the current key resolves. The monthly digest
//! is memoized separately, keyed by everything it is derived from.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use meetslot_core::digest::DailyDigest;
use meetslot_core::roster::{Attendee, AttendeeId};

use crate::month::VisibleMonth;

/// The identity of one busy-schedule fetch: visible month plus the sorted
/// email set it was issued for.
///
/// A fetch result is applied only while this key still matches the session's
/// current key; anything else is a stale response and is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchKey {
    /// The month the fetch covers.
    pub month: VisibleMonth,
    /// Sorted, deduplicated attendee emails included in the fetch.
    pub emails: Vec<String>,
}

impl FetchKey {
    /// Creates a fetch key, normalizing the email set.
    pub fn new(month: VisibleMonth, mut emails: Vec<String>) -> Self {
        emails.sort();
        emails.dedup();
        Self { month, emails }
    }
}

/// The busy data for the current fetch cycle.
///
/// Attendee records are created when the fetch resolves and live until the
/// next accepted resolution replaces the whole value. Never partially merged.
#[derive(Debug, Clone)]
pub struct BusyData {
    /// The key this data was fetched for.
    pub key: FetchKey,
    /// Connected attendees with their fetched busy intervals attached.
    pub attendees: BTreeMap<AttendeeId, Attendee>,
    /// True when the fetch failed and the busy map was defaulted to empty.
    /// Fail-open: slots are computed as if everyone is free, and the caller
    /// must surface a warning rather than present this as authoritative.
    pub degraded: bool,
    /// When the data was applied.
    pub fetched_at: DateTime<Utc>,
}

/// Everything the monthly digest is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestKey {
    /// The visible month.
    pub month: VisibleMonth,
    /// The participating attendee ids (required and optional).
    pub signature: Vec<AttendeeId>,
    /// The selected meeting duration.
    pub duration_minutes: i64,
}

/// A memoized digest together with the key it was built for.
#[derive(Debug, Clone)]
pub(crate) struct CachedDigest {
    pub(crate) key: DigestKey,
    pub(crate) digest: DailyDigest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_key_normalizes_emails() {
        let a = FetchKey::new(
            VisibleMonth::new(2025, 3),
            vec![
                "bob@x.io".to_string(),
                "alice@x.io".to_string(),
                "bob@x.io".to_string(),
            ],
        );
        let b = FetchKey::new(
            VisibleMonth::new(2025, 3),
            vec!["alice@x.io".to_string(), "bob@x.io".to_string()],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn fetch_key_distinguishes_months() {
        let emails = vec!["alice@x.io".to_string()];
        let march = FetchKey::new(VisibleMonth::new(2025, 3), emails.clone());
        let april = FetchKey::new(VisibleMonth::new(2025, 4), emails);
        assert_ne!(march, april);
    }
}
