//! Error types for StyleHub kernel operations.
//!
//! Two families:
//! - [`ValidationError`]: the submitted data is rejected (field values,
//!   interval invariants, opening hours).
//! - [`PolicyError`]: the action is not permitted in the current system
//!   state (lifecycle transitions, schedule locking, singleton rule).

use crate::lifecycle::{AppointmentState, Transition};
use crate::schedule::ShiftWindow;
use crate::store::EntityKind;
use chrono::{NaiveDateTime, Weekday};

const STAMP: &str = "%d/%m/%Y %H:%M";

/// Rejected input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A line's price or duration snapshot is out of range.
    #[error("invalid line {line} of appointment {appointment}: {reason}")]
    InvalidLine {
        appointment: String,
        line: u32,
        reason: String,
    },

    /// The lines add up to a span no appointment can cover.
    #[error(
        "appointment {appointment} would last {hours} hours (at most {} allowed)",
        crate::hours::MAX_APPOINTMENT_HOURS
    )]
    InvalidDuration { appointment: String, hours: f64 },

    #[error("invalid service '{name}': {reason}")]
    InvalidService { name: String, reason: String },

    #[error("invalid stylist: {reason}")]
    InvalidStylist { reason: String },

    #[error("invalid client: {reason}")]
    InvalidClient { reason: String },

    #[error("invalid schedule: {reason}")]
    InvalidSchedule { reason: String },

    #[error("a {kind} named '{name}' already exists")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("stylist '{name}' is archived and cannot take new bookings")]
    InactiveStylist { name: String },

    #[error("service '{name}' is archived and cannot be selected")]
    InactiveService { name: String },

    /// The stylist already has a non-cancelled appointment in the interval.
    #[error(
        "schedule conflict: stylist '{stylist}' already has appointment {conflicting_id} ({} - {}) overlapping {} - {}",
        .conflicting_start.format(STAMP),
        .conflicting_end.format(STAMP),
        .start.format(STAMP),
        .end.format(STAMP)
    )]
    ScheduleConflict {
        stylist: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
        conflicting_id: String,
        conflicting_start: NaiveDateTime,
        conflicting_end: NaiveDateTime,
    },

    /// The appointment is not fully inside any open shift of its day.
    #[error(
        "appointment on {} ({} - {}) is outside business hours (open {})",
        day(.weekday),
        .start.format("%H:%M"),
        .end.format("%H:%M"),
        join_windows(.windows)
    )]
    OutsideBusinessHours {
        weekday: Weekday,
        start: NaiveDateTime,
        end: NaiveDateTime,
        windows: Vec<ShiftWindow>,
    },

    #[error("the salon is closed on {}", day(.weekday))]
    ClosedDay { weekday: Weekday },
}

/// Action not permitted given the current system state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("cannot {action} appointment {id}: it is {from}")]
    InvalidTransition {
        id: String,
        action: Transition,
        from: AppointmentState,
    },

    #[error("a schedule is already configured; edit the existing one instead")]
    ScheduleAlreadyExists,

    #[error(
        "the schedule cannot be modified while {active_count} appointment(s) are draft or confirmed; cancel or complete them first"
    )]
    ScheduleLocked { active_count: usize },

    #[error("the schedule cannot be deleted; edit it instead")]
    ScheduleIsProtected,

    #[error("no schedule is configured; appointments cannot be booked")]
    NoScheduleConfigured,

    #[error("appointment {id} is done and can no longer be edited")]
    AppointmentCompleted { id: String },
}

/// Any failure surfaced by the [`Salon`](crate::Salon) write boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SalonError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
}

impl SalonError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// English weekday name.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn day(weekday: &Weekday) -> &'static str {
    weekday_name(*weekday)
}

fn join_windows(windows: &[ShiftWindow]) -> String {
    windows
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
