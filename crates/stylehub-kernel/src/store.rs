//! Storage port.
//!
//! The engine never scans collections itself. It asks the store to count or
//! list appointments that match an [`AppointmentFilter`], so an
//! implementation backed by an index or a database answers the same
//! questions as the in-memory one.

use crate::appointment::Appointment;
use crate::catalog::{Client, Service, Stylist};
use crate::lifecycle::AppointmentState;
use crate::schedule::SchedulePolicy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Service,
    Stylist,
    Client,
    Appointment,
    Schedule,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Stylist => "stylist",
            Self::Client => "client",
            Self::Appointment => "appointment",
            Self::Schedule => "schedule",
        }
    }

    /// Prefix of generated ids: `svc-1`, `sty-1`, `cli-1`, `apt-1`.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Service => "svc",
            Self::Stylist => "sty",
            Self::Client => "cli",
            Self::Appointment => "apt",
            Self::Schedule => "sch",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conjunction of optional appointment predicates. An empty filter matches
/// every appointment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub stylist_id: Option<String>,
    pub client_id: Option<String>,
    /// State must be one of these (when non-empty).
    pub states: Vec<AppointmentState>,
    /// State must not be one of these.
    pub excluded_states: Vec<AppointmentState>,
    pub exclude_id: Option<String>,
    /// `date_start < t`.
    pub starts_before: Option<DateTime<Utc>>,
    /// `date_end > t`.
    pub ends_after: Option<DateTime<Utc>>,
}

impl AppointmentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_stylist(mut self, stylist_id: impl Into<String>) -> Self {
        self.stylist_id = Some(stylist_id.into());
        self
    }

    pub fn for_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn in_states(mut self, states: &[AppointmentState]) -> Self {
        self.states = states.to_vec();
        self
    }

    pub fn not_in_state(mut self, state: AppointmentState) -> Self {
        self.excluded_states.push(state);
        self
    }

    pub fn excluding(mut self, id: impl Into<String>) -> Self {
        self.exclude_id = Some(id.into());
        self
    }

    pub fn starting_before(mut self, at: DateTime<Utc>) -> Self {
        self.starts_before = Some(at);
        self
    }

    pub fn ending_after(mut self, at: DateTime<Utc>) -> Self {
        self.ends_after = Some(at);
        self
    }

    /// Appointments whose `[date_start, date_end)` intersects `[start, end)`.
    pub fn overlapping(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.starting_before(end).ending_after(start)
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.stylist_id
            .as_ref()
            .is_none_or(|id| *id == appointment.stylist_id)
            && self
                .client_id
                .as_ref()
                .is_none_or(|id| *id == appointment.client_id)
            && (self.states.is_empty() || self.states.contains(&appointment.state))
            && !self.excluded_states.contains(&appointment.state)
            && self.exclude_id.as_deref() != Some(appointment.id.as_str())
            && self
                .starts_before
                .is_none_or(|at| appointment.date_start < at)
            && self.ends_after.is_none_or(|at| appointment.date_end > at)
    }
}

/// Read/write access to salon records.
///
/// Implementations must return `find_matching` results ordered by
/// `(date_start, id)`. `next_id` does not reserve anything: the id becomes
/// taken once a record carrying it is written.
pub trait SalonStore {
    fn service(&self, id: &str) -> Option<Service>;
    fn services(&self) -> Vec<Service>;
    fn stylist(&self, id: &str) -> Option<Stylist>;
    fn stylists(&self) -> Vec<Stylist>;
    fn client(&self, id: &str) -> Option<Client>;
    fn clients(&self) -> Vec<Client>;
    fn appointment(&self, id: &str) -> Option<Appointment>;
    fn schedule(&self) -> Option<SchedulePolicy>;

    fn count_matching(&self, filter: &AppointmentFilter) -> usize;
    fn find_matching(&self, filter: &AppointmentFilter, limit: Option<usize>) -> Vec<Appointment>;

    /// A fresh id for `kind`. Ids of removed records are not handed out again.
    fn next_id(&self, kind: EntityKind) -> String;

    fn put_service(&mut self, service: Service);
    fn put_stylist(&mut self, stylist: Stylist);
    fn put_client(&mut self, client: Client);
    fn put_appointment(&mut self, appointment: Appointment);
    fn put_schedule(&mut self, schedule: Option<SchedulePolicy>);
    fn remove_appointment(&mut self, id: &str) -> Option<Appointment>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn booked(id: &str, stylist: &str, hour: u32, state: AppointmentState) -> Appointment {
        let mut appointment = Appointment::new(id, "cli-1", stylist, at(hour));
        appointment.date_end = appointment.date_start + Duration::hours(1);
        appointment.state = state;
        appointment
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = AppointmentFilter::new();
        assert!(filter.matches(&booked("apt-1", "sty-1", 10, AppointmentState::Done)));
    }

    #[test]
    fn overlap_filter_is_half_open() {
        let filter = AppointmentFilter::new()
            .for_stylist("sty-1")
            .overlapping(at(11), at(12));
        assert!(!filter.matches(&booked("apt-1", "sty-1", 10, AppointmentState::Draft)));
        assert!(filter.matches(&booked("apt-2", "sty-1", 11, AppointmentState::Draft)));
        assert!(!filter.matches(&booked("apt-3", "sty-1", 12, AppointmentState::Draft)));
        assert!(!filter.matches(&booked("apt-4", "sty-2", 11, AppointmentState::Draft)));
    }

    #[test]
    fn state_filters_combine() {
        let filter = AppointmentFilter::new()
            .not_in_state(AppointmentState::Cancelled)
            .excluding("apt-2");
        assert!(filter.matches(&booked("apt-1", "sty-1", 10, AppointmentState::Confirmed)));
        assert!(!filter.matches(&booked("apt-2", "sty-1", 10, AppointmentState::Confirmed)));
        assert!(!filter.matches(&booked("apt-3", "sty-1", 10, AppointmentState::Cancelled)));

        let active = AppointmentFilter::new().in_states(&AppointmentState::ACTIVE);
        assert!(active.matches(&booked("apt-4", "sty-1", 10, AppointmentState::Draft)));
        assert!(!active.matches(&booked("apt-5", "sty-1", 10, AppointmentState::Done)));
    }

    #[test]
    fn entity_kind_renders_lowercase() {
        assert_eq!(EntityKind::Appointment.to_string(), "appointment");
        assert_eq!(EntityKind::Stylist.id_prefix(), "sty");
    }
}
