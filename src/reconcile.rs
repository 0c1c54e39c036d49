//! Deduplicate derived events against what a calendar already holds.

use crate::schedule::ScheduleEvent;
use log::debug;
use std::collections::HashSet;

/// Events of `new_events` that do not already appear in `existing`, in their original order.
///
/// Events match on value: type, start, end and all-day flag.
pub fn reconcile(new_events: Vec<ScheduleEvent>, existing: &[ScheduleEvent]) -> Vec<ScheduleEvent> {
    if new_events.is_empty() || existing.is_empty() {
        return new_events;
    }

    let known: HashSet<&ScheduleEvent> = existing.iter().collect();
    let total = new_events.len();
    let fresh: Vec<ScheduleEvent> = new_events.into_iter().filter(|e| !known.contains(e)).collect();

    debug!("{} of {} events already in calendar", total - fresh.len(), total);
    fresh
}
