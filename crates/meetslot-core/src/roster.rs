//! Attendees and the required/optional/pool roster.
//!
//! The roster partitions the connected-attendee population into three
//! mutually exclusive sets. Membership changes only through the mutation API
//! here, which preserves the invariant that every attendee id belongs to
//! exactly one set; availability results never move anyone.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::time::BusyInterval;

/// Opaque attendee identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendeeId(String);

impl AttendeeId {
    /// Creates an attendee id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttendeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttendeeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The role an attendee plays for a candidate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Must be conflict-free for a slot to be valid.
    Required,
    /// Annotated per slot as available or not, without gating validity.
    Optional,
}

/// A potential meeting participant with an email identity and a busy calendar.
///
/// Immutable within one computation cycle; owned by the fetch cycle that
/// retrieved its busy intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Unique attendee identifier.
    pub id: AttendeeId,
    /// The attendee's email address, used to query the busy-schedule source.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Busy intervals sourced from the external calendar provider.
    pub busy: Vec<BusyInterval>,
}

impl Attendee {
    /// Creates an attendee with an empty busy calendar.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: AttendeeId::new(id),
            email: email.into(),
            name: name.into(),
            busy: Vec::new(),
        }
    }

    /// Builder method to attach fetched busy intervals.
    pub fn with_busy(mut self, busy: Vec<BusyInterval>) -> Self {
        self.busy = busy;
        self
    }
}

/// One of the three roster sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Attendees whose freedom is mandatory for a slot.
    Required,
    /// Attendees annotated per slot without blocking it.
    Optional,
    /// Connected attendees not currently part of the meeting.
    Pool,
}

/// Error from roster mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// The id is not part of the connected-attendee population.
    #[error("attendee {0} is not in the roster")]
    UnknownAttendee(AttendeeId),
}

/// Serializable snapshot of a roster selection.
///
/// The session-seed output pair: the engine exposes the current selection as
/// this snapshot and can be re-seeded from one. How the snapshot travels
/// (query string, storage) is the caller's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    /// Ids selected as required.
    pub required: Vec<AttendeeId>,
    /// Ids selected as optional.
    pub optional: Vec<AttendeeId>,
}

/// The partition of all connected attendees into required/optional/pool.
///
/// Invariants: an attendee id appears in exactly one set, and the union of
/// the three sets equals the connected population the roster was seeded with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    required: BTreeSet<AttendeeId>,
    optional: BTreeSet<AttendeeId>,
    pool: BTreeSet<AttendeeId>,
}

impl Roster {
    /// Seeds a roster from the connected population.
    ///
    /// Every attendee starts in `required`, the session default when no
    /// prior selection is being restored.
    pub fn seed(ids: impl IntoIterator<Item = AttendeeId>) -> Self {
        Self {
            required: ids.into_iter().collect(),
            optional: BTreeSet::new(),
            pool: BTreeSet::new(),
        }
    }

    /// Seeds a roster from the connected population, restoring a prior
    /// selection.
    ///
    /// Snapshot ids that no longer match any connected attendee are dropped
    /// silently. Connected attendees absent from the snapshot land in the
    /// pool. An id named in both snapshot lists counts as required.
    pub fn from_snapshot(
        ids: impl IntoIterator<Item = AttendeeId>,
        snapshot: &RosterSnapshot,
    ) -> Self {
        let population: BTreeSet<AttendeeId> = ids.into_iter().collect();
        let required: BTreeSet<AttendeeId> = snapshot
            .required
            .iter()
            .filter(|id| population.contains(*id))
            .cloned()
            .collect();
        let optional: BTreeSet<AttendeeId> = snapshot
            .optional
            .iter()
            .filter(|id| population.contains(*id) && !required.contains(*id))
            .cloned()
            .collect();
        let pool = population
            .into_iter()
            .filter(|id| !required.contains(id) && !optional.contains(id))
            .collect();
        Self {
            required,
            optional,
            pool,
        }
    }

    /// Returns the section currently holding `id`, if any.
    pub fn section_of(&self, id: &AttendeeId) -> Option<Section> {
        if self.required.contains(id) {
            Some(Section::Required)
        } else if self.optional.contains(id) {
            Some(Section::Optional)
        } else if self.pool.contains(id) {
            Some(Section::Pool)
        } else {
            None
        }
    }

    /// Moves an attendee to the given section.
    ///
    /// Removes the id from whichever section holds it and inserts it into
    /// the target. No-op if already there. Unknown ids are rejected so the
    /// union invariant cannot drift.
    pub fn move_to(&mut self, id: &AttendeeId, to: Section) -> Result<(), RosterError> {
        let from = self
            .section_of(id)
            .ok_or_else(|| RosterError::UnknownAttendee(id.clone()))?;
        if from == to {
            return Ok(());
        }
        self.section_mut(from).remove(id);
        self.section_mut(to).insert(id.clone());
        debug_assert!(self.invariant_holds());
        Ok(())
    }

    /// Assigns every listed attendee to `required` and clears `optional`.
    ///
    /// This is the "select all" action over the currently-visible (possibly
    /// filtered) attendees; ids not in the roster are ignored.
    pub fn select_all<'a>(&mut self, visible: impl IntoIterator<Item = &'a AttendeeId>) {
        for id in visible {
            let _ = self.move_to(id, Section::Required);
        }
        self.clear(Section::Optional);
    }

    /// Empties exactly one section, returning its attendees to the pool.
    ///
    /// Clearing the pool itself is a no-op.
    pub fn clear(&mut self, section: Section) {
        if section == Section::Pool {
            return;
        }
        let emptied = std::mem::take(self.section_mut(section));
        self.pool.extend(emptied);
        debug_assert!(self.invariant_holds());
    }

    /// The required attendee ids.
    pub fn required(&self) -> &BTreeSet<AttendeeId> {
        &self.required
    }

    /// The optional attendee ids.
    pub fn optional(&self) -> &BTreeSet<AttendeeId> {
        &self.optional
    }

    /// The unassigned attendee ids.
    pub fn pool(&self) -> &BTreeSet<AttendeeId> {
        &self.pool
    }

    /// Sorted ids participating in the meeting (required then optional,
    /// merged in id order). Part of the derived-data cache key: the digest
    /// only depends on the roster through this set plus the role split.
    pub fn signature(&self) -> Vec<AttendeeId> {
        self.required.union(&self.optional).cloned().collect()
    }

    /// Total number of connected attendees across all sections.
    pub fn len(&self) -> usize {
        self.required.len() + self.optional.len() + self.pool.len()
    }

    /// Returns true when the roster holds no attendees at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exports the current selection.
    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            required: self.required.iter().cloned().collect(),
            optional: self.optional.iter().cloned().collect(),
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut BTreeSet<AttendeeId> {
        match section {
            Section::Required => &mut self.required,
            Section::Optional => &mut self.optional,
            Section::Pool => &mut self.pool,
        }
    }

    fn invariant_holds(&self) -> bool {
        self.required.is_disjoint(&self.optional)
            && self.required.is_disjoint(&self.pool)
            && self.optional.is_disjoint(&self.pool)
    }
}
