//! Appointment lines: one service instance inside an appointment.

use crate::catalog::Service;
use crate::error::ValidationError;
use crate::hours::MAX_APPOINTMENT_HOURS;
use serde::{Deserialize, Serialize};

/// A service booked within an appointment.
///
/// `price_unit` and `duration` are a snapshot of the service taken when it
/// was selected. Later catalog edits do not reach existing lines, and both
/// values stay editable on the line itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentLine {
    /// Sequence number, unique within the owning appointment.
    pub id: u32,
    pub appointment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    pub price_unit: f64,
    /// Fractional hours.
    pub duration: f64,
}

impl AppointmentLine {
    pub fn new(id: u32, appointment_id: impl Into<String>, service: &Service) -> Self {
        let mut line = Self {
            id,
            appointment_id: appointment_id.into(),
            service_id: None,
            price_unit: 0.0,
            duration: 0.0,
        };
        line.set_service(Some(service));
        line
    }

    /// Select (or clear) the line's service, copying its price and duration.
    ///
    /// Clearing resets both to zero, which leaves the line invalid until a
    /// service is selected again.
    pub fn set_service(&mut self, service: Option<&Service>) {
        match service {
            Some(service) => {
                self.service_id = Some(service.id.clone());
                self.price_unit = service.price;
                self.duration = service.duration;
            }
            None => {
                self.service_id = None;
                self.price_unit = 0.0;
                self.duration = 0.0;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let reason = if self.service_id.is_none() {
            Some("no service selected".to_string())
        } else if !self.price_unit.is_finite() {
            Some(format!("price must be finite (got {})", self.price_unit))
        } else if self.price_unit < 0.0 {
            Some(format!("price must not be negative (got {})", self.price_unit))
        } else if !self.duration.is_finite() {
            Some(format!("duration must be finite (got {})", self.duration))
        } else if self.duration <= 0.0 {
            Some(format!("duration must be positive (got {})", self.duration))
        } else if self.duration > MAX_APPOINTMENT_HOURS {
            Some(format!(
                "duration must not exceed {MAX_APPOINTMENT_HOURS} hours (got {})",
                self.duration
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ValidationError::InvalidLine {
                appointment: self.appointment_id.clone(),
                line: self.id,
                reason,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colour() -> Service {
        Service {
            id: "svc-2".to_string(),
            name: "Colour".to_string(),
            description: String::new(),
            price: 45.0,
            duration: 1.5,
            active: true,
        }
    }

    #[test]
    fn selecting_a_service_copies_its_snapshot() {
        let line = AppointmentLine::new(1, "apt-1", &colour());
        assert_eq!(line.service_id.as_deref(), Some("svc-2"));
        assert_eq!(line.price_unit, 45.0);
        assert_eq!(line.duration, 1.5);
        assert!(line.validate().is_ok());
    }

    #[test]
    fn snapshot_is_not_a_live_binding() {
        let mut service = colour();
        let line = AppointmentLine::new(1, "apt-1", &service);
        service.price = 60.0;
        assert_eq!(line.price_unit, 45.0);
    }

    #[test]
    fn clearing_the_service_zeroes_the_snapshot() {
        let mut line = AppointmentLine::new(1, "apt-1", &colour());
        line.set_service(None);
        assert_eq!(line.price_unit, 0.0);
        assert_eq!(line.duration, 0.0);
        assert!(line.validate().is_err());
    }

    #[test]
    fn rejects_negative_price_and_zero_duration() {
        let mut line = AppointmentLine::new(3, "apt-1", &colour());
        line.price_unit = -5.0;
        let err = line.validate().expect_err("negative price");
        assert_eq!(
            err.to_string(),
            "invalid line 3 of appointment apt-1: price must not be negative (got -5)"
        );

        line.price_unit = 5.0;
        line.duration = 0.0;
        assert!(line.validate().is_err());
    }

    #[test]
    fn rejects_infinite_and_oversized_durations() {
        let mut line = AppointmentLine::new(1, "apt-1", &colour());
        line.duration = f64::INFINITY;
        assert!(line.validate().is_err());
        line.duration = 30.0;
        assert!(line.validate().is_err());
        line.duration = 2.0;
        line.price_unit = f64::INFINITY;
        assert!(line.validate().is_err());
    }
}
