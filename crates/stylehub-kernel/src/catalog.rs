//! Reference records: services, stylists and clients.

use crate::error::ValidationError;
use crate::hours::MAX_APPOINTMENT_HOURS;
use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

/// A bookable service with its list price and duration in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub price: f64,
    /// Fractional hours: `0.5` is thirty minutes.
    pub duration: f64,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Service {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let reason = if self.name.trim().is_empty() {
            Some("name is required".to_string())
        } else if !self.price.is_finite() {
            Some(format!("price must be finite (got {})", self.price))
        } else if self.price < 0.0 {
            Some(format!("price must not be negative (got {})", self.price))
        } else if !self.duration.is_finite() {
            Some(format!("duration must be finite (got {})", self.duration))
        } else if self.duration <= 0.0 {
            Some(format!(
                "duration must be strictly positive (got {})",
                self.duration
            ))
        } else if self.duration > MAX_APPOINTMENT_HOURS {
            Some(format!(
                "duration must not exceed {MAX_APPOINTMENT_HOURS} hours (got {})",
                self.duration
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ValidationError::InvalidService {
                name: self.name.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// A staff member who can be booked. Archiving keeps past appointments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stylist {
    pub id: String,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
}

/// A salon client and its stored loyalty counters.
///
/// `appointment_done_count` and `is_frequent_client` are derived from the
/// client's appointments and rewritten by the engine whenever one of them
/// changes; they are never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default)]
    pub appointment_done_count: usize,
    #[serde(default)]
    pub is_frequent_client: bool,
}

impl Client {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::InvalidClient {
                reason: "name is required".to_string(),
            });
        }
        Ok(())
    }
}
