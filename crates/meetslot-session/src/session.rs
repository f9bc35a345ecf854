//! The booking session.
//!
//! [`BookingSession`] owns the roster, the active policy, the visible month,
//! and the single cached busy-data value. Slot and digest computations are
//! synchronous; the only asynchronous operation is the busy-schedule fetch,
//! which follows a last-key-wins discipline: a response is applied only if
//! the key it was issued for still matches the session's current key.
//!
//! The session fetches once per month for the full connected population and
//! filters locally, so moving attendees between required and optional never
//! triggers a refetch.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use meetslot_core::digest::{DailyDigest, build_digest};
use meetslot_core::policy::SchedulingPolicy;
use meetslot_core::roster::{Attendee, AttendeeId, Roster, RosterSnapshot, Section};
use meetslot_core::slots::{SlotContext, TimeSlotCandidate, generate_slots};
use meetslot_core::working_hours::WorkingHoursResolver;
use meetslot_providers::{BusyMap, BusyScheduleProvider, FetchRange, ProviderResult};

use crate::cache::{BusyData, CachedDigest, DigestKey, FetchKey};
use crate::error::SessionResult;
use crate::month::VisibleMonth;

/// A snapshot of what the next fetch should cover.
///
/// The key travels with the in-flight request so the response can be checked
/// against the session's key at resolution time.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// The cache key the fetch is issued for.
    pub key: FetchKey,
    /// The date range the fetch covers.
    pub range: FetchRange,
}

/// The result of applying a fetch resolution to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response matched the current key and was applied.
    Applied {
        /// True when the provider failed and empty busy data was applied.
        degraded: bool,
    },
    /// The response was issued for a key that no longer matches; discarded.
    Stale,
}

/// What the downstream meeting-creation collaborator receives once a slot is
/// picked. The engine's responsibility ends here.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookingSelection {
    /// Selected slot start.
    pub start: DateTime<Utc>,
    /// Selected slot end.
    pub end: DateTime<Utc>,
    /// Emails of the required attendees.
    pub required_emails: Vec<String>,
    /// Emails of the optional attendees.
    pub optional_emails: Vec<String>,
}

/// One visitor's guided booking flow.
pub struct BookingSession {
    provider: Arc<dyn BusyScheduleProvider>,
    resolver: Arc<dyn WorkingHoursResolver + Send + Sync>,
    /// The connected-attendee population, busy calendars empty. Used as the
    /// directory before the first fetch resolves and to rebuild attendee
    /// records on every accepted fetch.
    connected: BTreeMap<AttendeeId, Attendee>,
    roster: Roster,
    policy: SchedulingPolicy,
    month: VisibleMonth,
    busy: Option<BusyData>,
    digest: Option<CachedDigest>,
}

impl BookingSession {
    /// Creates a session for the given connected attendees.
    ///
    /// The policy is validated here; every attendee starts in the required
    /// section.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Policy`] if the policy is invalid.
    pub fn new(
        provider: Arc<dyn BusyScheduleProvider>,
        resolver: Arc<dyn WorkingHoursResolver + Send + Sync>,
        connected: Vec<Attendee>,
        policy: SchedulingPolicy,
        month: VisibleMonth,
    ) -> SessionResult<Self> {
        let policy = policy.validated()?;
        let roster = Roster::seed(connected.iter().map(|attendee| attendee.id.clone()));
        let connected = connected
            .into_iter()
            .map(|attendee| (attendee.id.clone(), attendee))
            .collect();
        Ok(Self {
            provider,
            resolver,
            connected,
            roster,
            policy,
            month,
            busy: None,
            digest: None,
        })
    }

    /// Restores a prior roster selection (e.g. from a shared link decoded by
    /// the caller). Snapshot ids that no longer match a connected attendee
    /// are dropped.
    pub fn restore_selection(&mut self, snapshot: &RosterSnapshot) {
        self.roster = Roster::from_snapshot(self.connected.keys().cloned(), snapshot);
        self.digest = None;
    }

    /// The current roster partition.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The active scheduling policy.
    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    /// The month currently shown.
    pub fn visible_month(&self) -> VisibleMonth {
        self.month
    }

    /// True when the last applied fetch failed and the session is running on
    /// empty busy data. Callers must surface this as a warning.
    pub fn degraded(&self) -> bool {
        self.busy.as_ref().is_some_and(|data| data.degraded)
    }

    /// Exports the current selection for the caller to serialize.
    pub fn selection_snapshot(&self) -> RosterSnapshot {
        self.roster.snapshot()
    }

    /// The key a fetch issued right now would carry: the visible month plus
    /// the full connected population's emails.
    pub fn current_fetch_key(&self) -> FetchKey {
        FetchKey::new(
            self.month,
            self.connected
                .values()
                .map(|attendee| attendee.email.clone())
                .collect(),
        )
    }

    /// True when no busy data is cached for the current key and a fetch
    /// should be issued.
    pub fn needs_refresh(&self) -> bool {
        self.busy
            .as_ref()
            .is_none_or(|data| data.key != self.current_fetch_key())
    }

    /// Snapshots the request for the next fetch.
    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest {
            key: self.current_fetch_key(),
            range: self.month.fetch_range(),
        }
    }

    /// Applies a resolved fetch.
    ///
    /// Last-key-wins: if `key` no longer matches the current key (the month
    /// or the connected population changed while the request was in flight),
    /// the response is discarded. A provider failure is applied as an empty
    /// busy map flagged degraded rather than an error, so availability stays
    /// computable; the flag must reach the user.
    pub fn apply_fetch(&mut self, key: FetchKey, result: ProviderResult<BusyMap>) -> FetchOutcome {
        if key != self.current_fetch_key() {
            debug!(month = ?key.month, "discarding stale busy fetch");
            return FetchOutcome::Stale;
        }

        let (busy_map, degraded) = match result {
            Ok(map) => (map, false),
            Err(err) => {
                warn!(error = %err, "busy fetch failed; computing slots as if everyone is free");
                (BusyMap::new(), true)
            }
        };

        let attendees = self
            .connected
            .values()
            .map(|attendee| {
                let busy = busy_map.get(&attendee.email).cloned().unwrap_or_default();
                (attendee.id.clone(), attendee.clone().with_busy(busy))
            })
            .collect();

        // Replaced as a whole, never merged with the previous cycle.
        self.busy = Some(BusyData {
            key,
            attendees,
            degraded,
            fetched_at: Utc::now(),
        });
        self.digest = None;
        debug!(degraded, "applied busy data for current fetch key");
        FetchOutcome::Applied { degraded }
    }

    /// Fetches busy data for the current key and applies it.
    ///
    /// Convenience wrapper around [`fetch_request`](Self::fetch_request) and
    /// [`apply_fetch`](Self::apply_fetch) for callers that do not interleave
    /// roster edits with in-flight fetches.
    pub async fn refresh(&mut self) -> FetchOutcome {
        let request = self.fetch_request();
        let provider = Arc::clone(&self.provider);
        let result = provider
            .fetch_busy(request.key.emails.clone(), request.range)
            .await;
        self.apply_fetch(request.key, result)
    }

    /// Shows a different month. Derived data is invalidated; the caller is
    /// expected to check [`needs_refresh`](Self::needs_refresh) and issue a
    /// new fetch.
    pub fn set_visible_month(&mut self, month: VisibleMonth) {
        if self.month != month {
            self.month = month;
            self.digest = None;
        }
    }

    /// Selects a different meeting duration from the offered menu.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Policy`] for a duration outside the menu.
    pub fn set_duration(&mut self, duration_minutes: i64) -> SessionResult<()> {
        let policy = SchedulingPolicy {
            duration_minutes,
            ..self.policy
        }
        .validated()?;
        self.policy = policy;
        Ok(())
    }

    /// Moves an attendee between roster sections.
    ///
    /// Busy data stays valid (it covers the full connected population), so
    /// only the derived digest is invalidated.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Roster`] for an id outside the population.
    pub fn move_attendee(&mut self, id: &AttendeeId, to: Section) -> SessionResult<()> {
        self.roster.move_to(id, to)?;
        self.digest = None;
        Ok(())
    }

    /// Assigns all listed attendees to required and clears optional.
    pub fn select_all(&mut self, visible: &[AttendeeId]) {
        self.roster.select_all(visible.iter());
        self.digest = None;
    }

    /// Empties one roster section back into the pool.
    pub fn clear_section(&mut self, section: Section) {
        self.roster.clear(section);
        self.digest = None;
    }

    /// The bookable slots for one day.
    ///
    /// Empty beyond the advance-booking horizon, on non-working days, and
    /// before the first fetch only if attendees are genuinely busy (before
    /// any fetch the connected directory with empty calendars is used).
    pub fn slots_for_day(&self, date: NaiveDate, now: DateTime<Utc>) -> Vec<TimeSlotCandidate> {
        if !self.policy.within_horizon(now.date_naive(), date) {
            return Vec::new();
        }
        let ctx = self.slot_context(now);
        generate_slots(date, self.resolver.resolve(date), &ctx)
    }

    /// The per-day availability digest for the visible month, memoized by
    /// `(month, roster signature, duration)` and additionally invalidated
    /// whenever new busy data is applied.
    pub fn month_digest(&mut self, now: DateTime<Utc>) -> &DailyDigest {
        let key = DigestKey {
            month: self.month,
            signature: self.roster.signature(),
            duration_minutes: self.policy.duration_minutes,
        };
        let cached = self.digest.as_ref().is_some_and(|entry| entry.key == key);
        if !cached {
            debug!(month = ?self.month, "rebuilding monthly availability digest");
            let digest = {
                let ctx = self.slot_context(now);
                build_digest(self.month.days(), self.resolver.as_ref(), &ctx)
            };
            self.digest = Some(CachedDigest { key, digest });
        }
        &self.digest.as_ref().expect("digest just ensured").digest
    }

    /// Packages a chosen slot for the downstream meeting-creation step.
    pub fn selection(&self, slot: &TimeSlotCandidate) -> BookingSelection {
        BookingSelection {
            start: slot.start,
            end: slot.end,
            required_emails: self.section_emails(self.roster.required()),
            optional_emails: self.section_emails(self.roster.optional()),
        }
    }

    fn section_emails(&self, ids: &std::collections::BTreeSet<AttendeeId>) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.connected.get(id))
            .map(|attendee| attendee.email.clone())
            .collect()
    }

    fn slot_context(&self, now: DateTime<Utc>) -> SlotContext<'_> {
        let attendees = self
            .busy
            .as_ref()
            .map(|data| &data.attendees)
            .unwrap_or(&self.connected);
        SlotContext {
            roster: &self.roster,
            attendees,
            policy: &self.policy,
            now,
        }
    }
}
