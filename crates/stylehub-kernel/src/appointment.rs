//! The appointment aggregate.

use crate::catalog::Service;
use crate::error::{PolicyError, ValidationError};
use crate::hours::{MAX_APPOINTMENT_HOURS, hours_to_duration};
use crate::lifecycle::{AppointmentState, Transition};
use crate::line::AppointmentLine;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A booking of one stylist for one client.
///
/// Derived fields (`reference`, `date_end`, totals, discount) are written by
/// the engine following the [`derive`](crate::derive) contract; callers read
/// them but never set them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    #[serde(default)]
    pub reference: String,
    pub client_id: String,
    pub stylist_id: String,
    pub date_start: DateTime<Utc>,
    pub date_end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<AppointmentLine>,

    #[serde(default)]
    pub total_duration: f64,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub final_amount: f64,

    #[serde(default)]
    pub state: AppointmentState,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl Appointment {
    /// A draft with no lines: it ends where it starts.
    pub fn new(
        id: impl Into<String>,
        client_id: impl Into<String>,
        stylist_id: impl Into<String>,
        date_start: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            reference: String::new(),
            client_id: client_id.into(),
            stylist_id: stylist_id.into(),
            date_start,
            date_end: date_start,
            lines: Vec::new(),
            total_duration: 0.0,
            total_amount: 0.0,
            discount_amount: 0.0,
            final_amount: 0.0,
            state: AppointmentState::Draft,
            notes: String::new(),
        }
    }

    /// Append a line for `service` and return its line id.
    pub fn add_line(&mut self, service: &Service) -> u32 {
        let id = self.lines.iter().map(|line| line.id).max().unwrap_or(0) + 1;
        self.lines
            .push(AppointmentLine::new(id, self.id.clone(), service));
        id
    }

    pub fn line(&self, line_id: u32) -> Option<&AppointmentLine> {
        self.lines.iter().find(|line| line.id == line_id)
    }

    pub fn line_mut(&mut self, line_id: u32) -> Option<&mut AppointmentLine> {
        self.lines.iter_mut().find(|line| line.id == line_id)
    }

    pub fn remove_line(&mut self, line_id: u32) -> Option<AppointmentLine> {
        let index = self.lines.iter().position(|line| line.id == line_id)?;
        Some(self.lines.remove(index))
    }

    /// Recompute `total_duration` and `total_amount` from the lines.
    pub fn recompute_totals(&mut self) {
        self.total_duration = self.lines.iter().map(|line| line.duration).sum();
        self.total_amount = self.lines.iter().map(|line| line.price_unit).sum();
    }

    /// `date_end = date_start + total_duration`. Fails, leaving `date_end`
    /// untouched, when the total exceeds [`MAX_APPOINTMENT_HOURS`].
    pub fn recompute_end(&mut self) -> Result<(), ValidationError> {
        let end = Some(self.total_duration)
            .filter(|hours| (0.0..=MAX_APPOINTMENT_HOURS).contains(hours))
            .and_then(hours_to_duration)
            .and_then(|length| self.date_start.checked_add_signed(length))
            .ok_or_else(|| ValidationError::InvalidDuration {
                appointment: self.id.clone(),
                hours: self.total_duration,
            })?;
        self.date_end = end;
        Ok(())
    }

    /// Rebuild the display reference from the client name and local start.
    pub fn refresh_reference(&mut self, client_name: Option<&str>, zone: &FixedOffset) {
        self.reference = match client_name {
            Some(name) => format!(
                "Appointment - {name} - {}",
                self.local_start(zone).format("%d/%m/%Y %H:%M")
            ),
            None => "New appointment".to_string(),
        };
    }

    /// Set the discount from the number of earlier completed appointments.
    pub fn apply_discount(&mut self, prior_done: usize) {
        self.discount_amount = crate::loyalty::discount_for(self.total_amount, prior_done);
        self.final_amount = self.total_amount - self.discount_amount;
    }

    /// Move along the lifecycle. Only the state field changes.
    pub fn apply_transition(&mut self, transition: Transition) -> Result<(), PolicyError> {
        let next = self
            .state
            .next(transition)
            .ok_or_else(|| PolicyError::InvalidTransition {
                id: self.id.clone(),
                action: transition,
                from: self.state,
            })?;
        self.state = next;
        Ok(())
    }

    /// Half-open intersection of `[date_start, date_end)` intervals.
    pub fn overlaps(&self, other: &Appointment) -> bool {
        other.date_start < self.date_end && other.date_end > self.date_start
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == AppointmentState::Cancelled
    }

    pub fn local_start(&self, zone: &FixedOffset) -> NaiveDateTime {
        self.date_start.with_timezone(zone).naive_local()
    }

    pub fn local_end(&self, zone: &FixedOffset) -> NaiveDateTime {
        self.date_end.with_timezone(zone).naive_local()
    }
}
