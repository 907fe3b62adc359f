//! # StyleHub Kernel
//!
//! Scheduling and business-policy engine for a salon: stylists are booked
//! against a catalog of timed services, and every write is checked against
//! the schedule integrity and commercial rules before it is committed.
//!
//! This crate is **storage-agnostic**: it does not prescribe how records are
//! persisted. It reads and writes through the [`SalonStore`] trait, whose
//! query primitives (`count_matching` / `find_matching`) take documented
//! [`AppointmentFilter`] predicates.
//!
//! ## Architecture
//!
//! ```text
//! Service ──snapshot──▶ AppointmentLine
//!                            │
//!                            ▼
//! SchedulePolicy ──▶ Appointment ◀── overlap / business hours
//!                            │
//!                            ▼
//!                    Client loyalty ──▶ discount
//! ```
//!
//! [`Salon`] is the write boundary. It validates a candidate record against
//! a consistent store snapshot, runs the derivations listed by the
//! [`derive`] invalidation contract, and only then writes.

pub mod appointment;
pub mod business_hours;
pub mod catalog;
pub mod derive;
pub mod engine;
pub mod error;
pub mod hours;
pub mod lifecycle;
pub mod line;
pub mod loyalty;
pub mod overlap;
pub mod registry;
pub mod schedule;
pub mod store;

#[cfg(test)]
mod fixture;

pub use appointment::Appointment;
pub use catalog::{Client, Service, Stylist};
pub use derive::{Change, Check, Derivation, Invalidation};
pub use engine::{AppointmentEdit, AppointmentRequest, LineRequest, Salon};
pub use error::{PolicyError, SalonError, ValidationError};
pub use hours::{format_hours, hours_to_duration, local_to_utc};
pub use lifecycle::{AppointmentState, Transition};
pub use line::AppointmentLine;
pub use loyalty::{LoyaltyStatus, discount_for, loyalty_status, prior_done_count};
pub use registry::{ClientPatch, NewClient, NewService, NewStylist, ServicePatch, StylistPatch};
pub use schedule::{SchedulePatch, SchedulePolicy, Shift, ShiftWindow};
pub use store::{AppointmentFilter, EntityKind, SalonStore};
