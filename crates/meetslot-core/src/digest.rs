//! Per-day availability digest for a month of calendar cells.
//!
//! The digest answers "is anyone free this day" for every visible date. It
//! is a batch application of [`generate_slots`] so the calendar indicators
//! and the detailed slot list for a selected day can never disagree.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use crate::roster::AttendeeId;
use crate::slots::{SlotContext, generate_slots};
use crate::working_hours::WorkingHoursResolver;

/// Per-day set of attendees with at least one open slot.
pub type DailyDigest = BTreeMap<NaiveDate, BTreeSet<AttendeeId>>;

/// Builds the per-day availability digest for the visible date range.
///
/// Each visible day maps to the union of attendee ids flagged available
/// across that day's generated slots. Days outside the bookable horizon
/// (past days and days beyond `max_advance_days`), closed days, and days
/// with zero slots all map to the empty set, which renders as "no
/// availability". The horizon filter here matches the one applied to the
/// day view, so the two can never disagree about a date.
pub fn build_digest(
    visible_days: impl IntoIterator<Item = NaiveDate>,
    resolver: &dyn WorkingHoursResolver,
    ctx: &SlotContext<'_>,
) -> DailyDigest {
    let today = ctx.now.date_naive();
    visible_days
        .into_iter()
        .map(|date| {
            if !ctx.policy.within_horizon(today, date) {
                return (date, BTreeSet::new());
            }
            let available = generate_slots(date, resolver.resolve(date), ctx)
                .iter()
                .flat_map(|slot| slot.available_ids().cloned())
                .collect();
            (date, available)
        })
        .collect()
}
