//! Client loyalty: completed-visit counters and the frequent-client discount.

use crate::appointment::Appointment;
use crate::lifecycle::AppointmentState;
use crate::store::{AppointmentFilter, SalonStore};
use serde::{Deserialize, Serialize};

/// A client is frequent with strictly more completed visits than this.
pub const FREQUENT_CLIENT_THRESHOLD: usize = 5;

/// Completed visits before an appointment needed to earn the discount.
pub const DISCOUNT_MIN_PRIOR_VISITS: usize = 5;

pub const DISCOUNT_RATE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyStatus {
    pub done_count: usize,
    pub is_frequent: bool,
}

/// Current counters for `client_id`, counted over all its done appointments.
pub fn loyalty_status<S: SalonStore + ?Sized>(store: &S, client_id: &str) -> LoyaltyStatus {
    let done_count = store.count_matching(
        &AppointmentFilter::new()
            .for_client(client_id)
            .in_states(&[AppointmentState::Done]),
    );
    LoyaltyStatus {
        done_count,
        is_frequent: done_count > FREQUENT_CLIENT_THRESHOLD,
    }
}

/// Done appointments of the same client that started strictly before
/// `appointment`, excluding `appointment` itself.
pub fn prior_done_count<S: SalonStore + ?Sized>(store: &S, appointment: &Appointment) -> usize {
    store.count_matching(
        &AppointmentFilter::new()
            .for_client(&appointment.client_id)
            .in_states(&[AppointmentState::Done])
            .excluding(&appointment.id)
            .starting_before(appointment.date_start),
    )
}

/// Discount on `total` for a client with `prior_done` earlier visits.
pub fn discount_for(total: f64, prior_done: usize) -> f64 {
    if prior_done >= DISCOUNT_MIN_PRIOR_VISITS {
        total * DISCOUNT_RATE
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_starts_at_the_sixth_visit() {
        assert_eq!(discount_for(80.0, 0), 0.0);
        assert_eq!(discount_for(80.0, 4), 0.0);
        assert_eq!(discount_for(80.0, 5), 4.0);
        assert_eq!(discount_for(80.0, 12), 4.0);
    }

    #[test]
    fn free_appointments_get_no_discount() {
        assert_eq!(discount_for(0.0, 9), 0.0);
    }
}
