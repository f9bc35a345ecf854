//! Core types and the availability engine: intervals, roster, policy, slots, digest

pub mod conflict;
pub mod digest;
pub mod policy;
pub mod roster;
pub mod slots;
pub mod time;
pub mod tracing;
pub mod working_hours;

pub use conflict::conflicts;
pub use digest::{DailyDigest, build_digest};
pub use policy::{ALLOWED_DURATIONS_MINUTES, PolicyError, SchedulingPolicy};
pub use roster::{Attendee, AttendeeId, Role, Roster, RosterError, RosterSnapshot, Section};
pub use slots::{AttendeeAvailability, SlotContext, TimeSlotCandidate, generate_slots};
pub use time::BusyInterval;
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use working_hours::{WeeklyHours, WorkingHoursResolver, WorkingHoursWindow};
