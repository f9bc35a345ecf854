//! Slot generation for a single calendar day.
//!
//! Given the roster, the fetched busy calendars, the day's working hours,
//! and the active policy, [`generate_slots`] produces the ordered list of
//! bookable candidates. Required attendees gate a slot; optional attendees
//! only annotate it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::conflict::conflicts;
use crate::policy::SchedulingPolicy;
use crate::roster::{Attendee, AttendeeId, Role, Roster};
use crate::working_hours::WorkingHoursWindow;

/// Per-attendee availability for one candidate slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeAvailability {
    /// The attendee this entry describes.
    pub attendee_id: AttendeeId,
    /// Whether the attendee is required or optional for the meeting.
    pub role: Role,
    /// Whether the attendee is free for the whole slot.
    pub available: bool,
}

/// A candidate meeting interval of exactly the policy duration.
///
/// Created fresh per computation; never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlotCandidate {
    /// Slot start (inclusive).
    pub start: DateTime<Utc>,
    /// Slot end (exclusive).
    pub end: DateTime<Utc>,
    /// Availability per participating attendee, required entries first.
    pub attendee_availability: Vec<AttendeeAvailability>,
}

impl TimeSlotCandidate {
    /// Returns the slot length in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Iterates over the ids of attendees free for this slot.
    pub fn available_ids(&self) -> impl Iterator<Item = &AttendeeId> {
        self.attendee_availability
            .iter()
            .filter(|entry| entry.available)
            .map(|entry| &entry.attendee_id)
    }

    /// Returns true when every listed attendee, optional included, is free.
    pub fn fully_available(&self) -> bool {
        self.attendee_availability.iter().all(|entry| entry.available)
    }
}

/// Shared inputs for slot generation and the monthly digest.
///
/// `attendees` is the connected-attendee directory for the current fetch
/// cycle, busy calendars attached. Roster ids with no entry in it are
/// unresolvable and are filtered out before generation.
#[derive(Debug, Clone, Copy)]
pub struct SlotContext<'a> {
    /// The required/optional/pool partition.
    pub roster: &'a Roster,
    /// Connected attendees with their fetched busy intervals.
    pub attendees: &'a BTreeMap<AttendeeId, Attendee>,
    /// The validated scheduling policy.
    pub policy: &'a SchedulingPolicy,
    /// The current instant, used only for the same-day notice cutoff.
    pub now: DateTime<Utc>,
}

/// Generates the ordered list of bookable slots for one calendar day.
///
/// `hours` is the resolved working window for `date`; `None` means a
/// non-working day and yields no slots. The minimum-notice cutoff applies
/// only when `date` is the current calendar day; future days generate from
/// the window start regardless of how close to now they are.
///
/// The caller guarantees a validated policy. Output is ascending by start
/// time and non-overlapping since the step size equals the duration.
pub fn generate_slots(
    date: NaiveDate,
    hours: Option<WorkingHoursWindow>,
    ctx: &SlotContext<'_>,
) -> Vec<TimeSlotCandidate> {
    debug_assert!(ctx.policy.validate().is_ok(), "policy must be validated");

    let Some(window) = hours else {
        return Vec::new();
    };

    let window_start = date.and_time(window.start_time).and_utc();
    let window_end = date.and_time(window.end_time).and_utc();

    // Notice is enforced for same-day bookings only.
    let effective_start = if date == ctx.now.date_naive() {
        window_start.max(ctx.now + ctx.policy.notice())
    } else {
        window_start
    };

    let duration = ctx.policy.duration();
    let required = resolvable(ctx, Role::Required);
    let optional = resolvable(ctx, Role::Optional);

    let mut slots = Vec::new();
    let mut cursor = effective_start;
    while cursor < window_end {
        let slot_end = cursor + duration;
        if slot_end > window_end {
            break;
        }

        // Required attendees must be unanimously free.
        if required
            .iter()
            .all(|attendee| !conflicts(cursor, slot_end, &attendee.busy))
        {
            let mut availability = Vec::with_capacity(required.len() + optional.len());
            availability.extend(required.iter().map(|attendee| AttendeeAvailability {
                attendee_id: attendee.id.clone(),
                role: Role::Required,
                available: true,
            }));
            availability.extend(optional.iter().map(|attendee| AttendeeAvailability {
                attendee_id: attendee.id.clone(),
                role: Role::Optional,
                available: !conflicts(cursor, slot_end, &attendee.busy),
            }));
            slots.push(TimeSlotCandidate {
                start: cursor,
                end: slot_end,
                attendee_availability: availability,
            });
        }

        cursor = slot_end;
    }
    slots
}

/// Resolves the roster section for `role` against the attendee directory,
/// silently dropping ids with no connected attendee.
fn resolvable<'a>(ctx: &SlotContext<'a>, role: Role) -> Vec<&'a Attendee> {
    let section = match role {
        Role::Required => ctx.roster.required(),
        Role::Optional => ctx.roster.optional(),
    };
    section
        .iter()
        .filter_map(|id| ctx.attendees.get(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Section;
    use crate::time::BusyInterval;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn directory(attendees: Vec<Attendee>) -> BTreeMap<AttendeeId, Attendee> {
        attendees
            .into_iter()
            .map(|attendee| (attendee.id.clone(), attendee))
            .collect()
    }

    fn attendee(email: &str) -> Attendee {
        Attendee::new(email, email, email.split('@').next().unwrap())
    }

    /// A quiet future day relative to the test "now".
    const DAY: (i32, u32, u32) = (2025, 3, 12);

    fn far_now() -> DateTime<Utc> {
        utc(2025, 3, 10, 8, 0, 0)
    }

    fn policy_60() -> SchedulingPolicy {
        SchedulingPolicy::with_duration(60)
    }

    #[test]
    fn scenario_a_full_window() {
        // 09:00-12:00, duration 60, nobody busy => exactly three slots.
        let alice = attendee("alice@x.io");
        let roster = Roster::seed([alice.id.clone()]);
        let attendees = directory(vec![alice]);
        let policy = policy_60();
        let ctx = SlotContext {
            roster: &roster,
            attendees: &attendees,
            policy: &policy,
            now: far_now(),
        };

        let slots = generate_slots(
            date(DAY.0, DAY.1, DAY.2),
            Some(WorkingHoursWindow::from_hours(9, 12)),
            &ctx,
        );

        let bounds: Vec<(DateTime<Utc>, DateTime<Utc>)> =
            slots.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(
            bounds,
            vec![
                (utc(2025, 3, 12, 9, 0, 0), utc(2025, 3, 12, 10, 0, 0)),
                (utc(2025, 3, 12, 10, 0, 0), utc(2025, 3, 12, 11, 0, 0)),
                (utc(2025, 3, 12, 11, 0, 0), utc(2025, 3, 12, 12, 0, 0)),
            ]
        );
    }

    #[test]
    fn scenario_b_required_conflict_excludes_slot() {
        // Required attendee busy 10:00-10:30 knocks out the 10:00-11:00 slot.
        let alice = attendee("alice@x.io").with_busy(vec![BusyInterval::new(
            utc(2025, 3, 12, 10, 0, 0),
            utc(2025, 3, 12, 10, 30, 0),
        )]);
        let roster = Roster::seed([alice.id.clone()]);
        let attendees = directory(vec![alice]);
        let policy = policy_60();
        let ctx = SlotContext {
            roster: &roster,
            attendees: &attendees,
            policy: &policy,
            now: far_now(),
        };

        let slots = generate_slots(
            date(DAY.0, DAY.1, DAY.2),
            Some(WorkingHoursWindow::from_hours(9, 12)),
            &ctx,
        );

        let starts: Vec<DateTime<Utc>> = slots.iter().map(|s| s.start).collect();
        assert_eq!(
            starts,
            vec![utc(2025, 3, 12, 9, 0, 0), utc(2025, 3, 12, 11, 0, 0)]
        );
    }

    #[test]
    fn scenario_c_same_day_notice_cutoff() {
        // now = 10:00, notice 4h, window 09:00-18:00 => first slot at 14:00.
        let alice = attendee("alice@x.io");
        let roster = Roster::seed([alice.id.clone()]);
        let attendees = directory(vec![alice]);
        let policy = policy_60();
        let now = utc(2025, 3, 12, 10, 0, 0);
        let ctx = SlotContext {
            roster: &roster,
            attendees: &attendees,
            policy: &policy,
            now,
        };

        let slots = generate_slots(
            date(DAY.0, DAY.1, DAY.2),
            Some(WorkingHoursWindow::from_hours(9, 18)),
            &ctx,
        );

        assert_eq!(slots.first().unwrap().start, utc(2025, 3, 12, 14, 0, 0));
        assert_eq!(slots.len(), 4); // 14, 15, 16, 17
    }

    #[test]
    fn notice_does_not_delay_future_days() {
        // Tomorrow generates from the window start even minutes from now.
        let alice = attendee("alice@x.io");
        let roster = Roster::seed([alice.id.clone()]);
        let attendees = directory(vec![alice]);
        let policy = policy_60();
        let ctx = SlotContext {
            roster: &roster,
            attendees: &attendees,
            policy: &policy,
            now: utc(2025, 3, 11, 23, 55, 0),
        };

        let slots = generate_slots(
            date(DAY.0, DAY.1, DAY.2),
            Some(WorkingHoursWindow::from_hours(9, 12)),
            &ctx,
        );
        assert_eq!(slots.first().unwrap().start, utc(2025, 3, 12, 9, 0, 0));
    }

    #[test]
    fn scenario_d_optional_conflict_annotates_only() {
        let alice = attendee("alice@x.io");
        let bob = attendee("bob@x.io").with_busy(vec![BusyInterval::new(
            utc(2025, 3, 12, 9, 0, 0),
            utc(2025, 3, 12, 12, 0, 0),
        )]);
        let mut roster = Roster::seed([alice.id.clone(), bob.id.clone()]);
        roster.move_to(&bob.id, Section::Optional).unwrap();
        let attendees = directory(vec![alice, bob]);
        let policy = policy_60();
        let ctx = SlotContext {
            roster: &roster,
            attendees: &attendees,
            policy: &policy,
            now: far_now(),
        };

        let slots = generate_slots(
            date(DAY.0, DAY.1, DAY.2),
            Some(WorkingHoursWindow::from_hours(9, 12)),
            &ctx,
        );

        // Slots survive; the optional attendee is annotated unavailable.
        assert_eq!(slots.len(), 3);
        for slot in &slots {
            assert_eq!(slot.attendee_availability.len(), 2);
            assert_eq!(slot.attendee_availability[0].role, Role::Required);
            assert!(slot.attendee_availability[0].available);
            assert_eq!(slot.attendee_availability[1].role, Role::Optional);
            assert!(!slot.attendee_availability[1].available);
            assert!(!slot.fully_available());
        }
    }

    #[test]
    fn scenario_e_closed_day_yields_nothing() {
        let alice = attendee("alice@x.io");
        let roster = Roster::seed([alice.id.clone()]);
        let attendees = directory(vec![alice]);
        let policy = policy_60();
        let ctx = SlotContext {
            roster: &roster,
            attendees: &attendees,
            policy: &policy,
            now: far_now(),
        };

        assert!(generate_slots(date(DAY.0, DAY.1, DAY.2), None, &ctx).is_empty());
    }

    #[test]
    fn busy_ending_at_slot_start_does_not_exclude() {
        // Boundary property: a busy interval touching a slot edge never
        // removes that slot.
        let alice = attendee("alice@x.io").with_busy(vec![
            BusyInterval::new(utc(2025, 3, 12, 8, 0, 0), utc(2025, 3, 12, 9, 0, 0)),
            BusyInterval::new(utc(2025, 3, 12, 12, 0, 0), utc(2025, 3, 12, 13, 0, 0)),
        ]);
        let roster = Roster::seed([alice.id.clone()]);
        let attendees = directory(vec![alice]);
        let policy = policy_60();
        let ctx = SlotContext {
            roster: &roster,
            attendees: &attendees,
            policy: &policy,
            now: far_now(),
        };

        let slots = generate_slots(
            date(DAY.0, DAY.1, DAY.2),
            Some(WorkingHoursWindow::from_hours(9, 12)),
            &ctx,
        );
        assert_eq!(slots.len(), 3);
    }

    #[test]
    fn zero_required_returns_every_slot() {
        let bob = attendee("bob@x.io").with_busy(vec![BusyInterval::new(
            utc(2025, 3, 12, 9, 0, 0),
            utc(2025, 3, 12, 10, 0, 0),
        )]);
        let mut roster = Roster::seed([bob.id.clone()]);
        roster.move_to(&bob.id, Section::Optional).unwrap();
        let attendees = directory(vec![bob]);
        let policy = policy_60();
        let ctx = SlotContext {
            roster: &roster,
            attendees: &attendees,
            policy: &policy,
            now: far_now(),
        };

        let slots = generate_slots(
            date(DAY.0, DAY.1, DAY.2),
            Some(WorkingHoursWindow::from_hours(9, 12)),
            &ctx,
        );

        assert_eq!(slots.len(), 3);
        assert!(!slots[0].attendee_availability[0].available);
        assert!(slots[1].attendee_availability[0].available);
    }

    #[test]
    fn unresolvable_roster_ids_are_filtered() {
        // A roster id with no connected attendee neither blocks nor annotates.
        let alice = attendee("alice@x.io");
        let roster = Roster::seed([alice.id.clone(), AttendeeId::new("gone@x.io")]);
        let attendees = directory(vec![alice]);
        let policy = policy_60();
        let ctx = SlotContext {
            roster: &roster,
            attendees: &attendees,
            policy: &policy,
            now: far_now(),
        };

        let slots = generate_slots(
            date(DAY.0, DAY.1, DAY.2),
            Some(WorkingHoursWindow::from_hours(9, 12)),
            &ctx,
        );
        assert_eq!(slots.len(), 3);
        for slot in &slots {
            assert_eq!(slot.attendee_availability.len(), 1);
        }
    }

    #[test]
    fn partial_slot_at_window_end_discarded() {
        // 09:00-10:30 with 60-minute slots fits only one candidate.
        let alice = attendee("alice@x.io");
        let roster = Roster::seed([alice.id.clone()]);
        let attendees = directory(vec![alice]);
        let policy = policy_60();
        let ctx = SlotContext {
            roster: &roster,
            attendees: &attendees,
            policy: &policy,
            now: far_now(),
        };

        let window = WorkingHoursWindow::new(
            chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            chrono::NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        );
        let slots = generate_slots(date(DAY.0, DAY.1, DAY.2), Some(window), &ctx);
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn slots_have_exact_duration_and_ascending_order() {
        let alice = attendee("alice@x.io");
        let roster = Roster::seed([alice.id.clone()]);
        let attendees = directory(vec![alice]);
        let policy = SchedulingPolicy::with_duration(45);
        let ctx = SlotContext {
            roster: &roster,
            attendees: &attendees,
            policy: &policy,
            now: far_now(),
        };

        let slots = generate_slots(
            date(DAY.0, DAY.1, DAY.2),
            Some(WorkingHoursWindow::from_hours(9, 17)),
            &ctx,
        );

        assert!(!slots.is_empty());
        for slot in &slots {
            assert_eq!(slot.duration_minutes(), 45);
        }
        for pair in slots.windows(2) {
            assert!(pair[0].end <= pair[1].start);
            assert!(pair[0].start < pair[1].start);
        }
    }

    #[test]
    fn generation_is_idempotent() {
        let alice = attendee("alice@x.io").with_busy(vec![BusyInterval::new(
            utc(2025, 3, 12, 11, 0, 0),
            utc(2025, 3, 12, 11, 30, 0),
        )]);
        let roster = Roster::seed([alice.id.clone()]);
        let attendees = directory(vec![alice]);
        let policy = SchedulingPolicy::with_duration(30);
        let ctx = SlotContext {
            roster: &roster,
            attendees: &attendees,
            policy: &policy,
            now: far_now(),
        };

        let window = Some(WorkingHoursWindow::from_hours(9, 13));
        let first = generate_slots(date(DAY.0, DAY.1, DAY.2), window, &ctx);
        let second = generate_slots(date(DAY.0, DAY.1, DAY.2), window, &ctx);
        assert_eq!(first, second);
    }
}
