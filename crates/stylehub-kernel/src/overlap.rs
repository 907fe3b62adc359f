//! Stylist double-booking check.

use crate::appointment::Appointment;
use crate::error::ValidationError;
use crate::lifecycle::AppointmentState;
use crate::store::{AppointmentFilter, SalonStore};
use chrono::FixedOffset;

/// The earliest non-cancelled appointment of the same stylist whose interval
/// intersects `candidate`'s, ignoring `candidate` itself.
pub fn find_conflict<S: SalonStore + ?Sized>(
    store: &S,
    candidate: &Appointment,
) -> Option<Appointment> {
    let filter = AppointmentFilter::new()
        .for_stylist(&candidate.stylist_id)
        .not_in_state(AppointmentState::Cancelled)
        .excluding(&candidate.id)
        .overlapping(candidate.date_start, candidate.date_end);
    store.find_matching(&filter, Some(1)).into_iter().next()
}

/// Fail when `candidate` would double-book its stylist.
///
/// Cancelled candidates never conflict. A zero-length candidate can still
/// conflict when its instant falls strictly inside another appointment.
pub fn check_stylist_overlap<S: SalonStore + ?Sized>(
    store: &S,
    candidate: &Appointment,
    zone: &FixedOffset,
) -> Result<(), ValidationError> {
    if candidate.is_cancelled() {
        return Ok(());
    }
    let Some(conflict) = find_conflict(store, candidate) else {
        return Ok(());
    };

    let stylist = store
        .stylist(&candidate.stylist_id)
        .map(|stylist| stylist.name)
        .unwrap_or_else(|| candidate.stylist_id.clone());
    tracing::debug!(
        candidate = %candidate.id,
        conflicting = %conflict.id,
        "stylist already booked in interval"
    );
    Err(ValidationError::ScheduleConflict {
        stylist,
        start: candidate.local_start(zone),
        end: candidate.local_end(zone),
        conflicting_id: conflict.id.clone(),
        conflicting_start: conflict.local_start(zone),
        conflicting_end: conflict.local_end(zone),
    })
}
