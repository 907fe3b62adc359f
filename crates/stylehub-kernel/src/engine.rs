//! The write boundary: every appointment and schedule mutation goes
//! through [`Salon`].
//!
//! A write builds the candidate record, recomputes the derivations its
//! [`Invalidation`] lists, runs the required checks against the current
//! store contents and only then writes. A rejected write leaves the store
//! untouched.

use crate::appointment::Appointment;
use crate::business_hours::check_business_hours;
use crate::catalog::Service;
use crate::derive::{Change, Check, Derivation, Invalidation};
use crate::error::{PolicyError, SalonError, ValidationError};
use crate::hours::local_to_utc;
use crate::lifecycle::{AppointmentState, Transition};
use crate::loyalty::{LoyaltyStatus, loyalty_status, prior_done_count};
use crate::overlap::check_stylist_overlap;
use crate::schedule::{SchedulePatch, SchedulePolicy};
use crate::store::{AppointmentFilter, EntityKind, SalonStore};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One service to book, optionally overriding its list price or duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRequest {
    pub service_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_unit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl LineRequest {
    pub fn service(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            price_unit: None,
            duration: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub client_id: String,
    pub stylist_id: String,
    pub date_start: DateTime<Utc>,
    #[serde(default)]
    pub lines: Vec<LineRequest>,
    #[serde(default)]
    pub notes: String,
}

/// A single edit of an existing appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
pub enum AppointmentEdit {
    Stylist { stylist_id: String },
    Client { client_id: String },
    Start { date_start: DateTime<Utc> },
    Notes { notes: String },
    AddService { service_id: String },
    /// `None` clears the line's service, which leaves it invalid.
    ReplaceService {
        line_id: u32,
        service_id: Option<String>,
    },
    LinePrice { line_id: u32, price_unit: f64 },
    LineDuration { line_id: u32, duration: f64 },
    RemoveLine { line_id: u32 },
}

/// Salon engine bound to a store and the salon's local UTC offset.
pub struct Salon<'a, S: SalonStore + ?Sized> {
    pub(crate) store: &'a mut S,
    zone: FixedOffset,
}

impl<'a, S: SalonStore + ?Sized> Salon<'a, S> {
    pub fn new(store: &'a mut S, zone: FixedOffset) -> Self {
        Self { store, zone }
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    pub fn store(&self) -> &S {
        &*self.store
    }

    /// Interpret a local wall-clock time in the salon's zone.
    pub fn local_to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        local_to_utc(local, &self.zone)
    }

    pub fn appointment(&self, id: &str) -> Result<Appointment, SalonError> {
        self.store
            .appointment(id)
            .ok_or_else(|| SalonError::not_found(EntityKind::Appointment, id))
    }

    pub fn list_appointments(&self, filter: &AppointmentFilter) -> Vec<Appointment> {
        self.store.find_matching(filter, None)
    }

    // ── Appointments ──────────────────────────────────────────────

    pub fn create_appointment(
        &mut self,
        request: AppointmentRequest,
    ) -> Result<Appointment, SalonError> {
        let result = self.try_create(request);
        if let Err(err) = &result {
            tracing::warn!(%err, "booking rejected");
        }
        result
    }

    fn try_create(&mut self, request: AppointmentRequest) -> Result<Appointment, SalonError> {
        if self.store.client(&request.client_id).is_none() {
            return Err(SalonError::not_found(EntityKind::Client, request.client_id));
        }
        if self.store.stylist(&request.stylist_id).is_none() {
            return Err(SalonError::not_found(
                EntityKind::Stylist,
                request.stylist_id,
            ));
        }

        let id = self.store.next_id(EntityKind::Appointment);
        let mut appointment = Appointment::new(
            id,
            request.client_id,
            request.stylist_id,
            request.date_start,
        );
        appointment.notes = request.notes;

        for line in request.lines {
            let service = self.bookable_service(&line.service_id)?;
            let line_id = appointment.add_line(&service);
            if let Some(added) = appointment.line_mut(line_id) {
                if let Some(price) = line.price_unit {
                    added.price_unit = price;
                }
                if let Some(duration) = line.duration {
                    added.duration = duration;
                }
            }
        }

        let committed = self.commit(appointment, None, &Invalidation::of(&[Change::Created]))?;
        tracing::info!(
            appointment = %committed.id,
            stylist = %committed.stylist_id,
            start = %committed.date_start,
            "appointment booked"
        );
        Ok(committed)
    }

    /// Apply `edits` in order and commit them as one write.
    pub fn edit_appointment(
        &mut self,
        id: &str,
        edits: Vec<AppointmentEdit>,
    ) -> Result<Appointment, SalonError> {
        let result = self.try_edit(id, edits);
        if let Err(err) = &result {
            tracing::warn!(appointment = id, %err, "edit rejected");
        }
        result
    }

    fn try_edit(&mut self, id: &str, edits: Vec<AppointmentEdit>) -> Result<Appointment, SalonError> {
        let mut appointment = self.appointment(id)?;
        if appointment.state == AppointmentState::Done {
            return Err(PolicyError::AppointmentCompleted { id: id.to_string() }.into());
        }
        let previous_client = appointment.client_id.clone();
        let mut invalidation = Invalidation::new();

        for edit in edits {
            match edit {
                AppointmentEdit::Stylist { stylist_id } => {
                    if stylist_id != appointment.stylist_id {
                        appointment.stylist_id = stylist_id;
                        invalidation.record(Change::StylistChanged);
                    }
                }
                AppointmentEdit::Client { client_id } => {
                    if self.store.client(&client_id).is_none() {
                        return Err(SalonError::not_found(EntityKind::Client, client_id));
                    }
                    if client_id != appointment.client_id {
                        appointment.client_id = client_id;
                        invalidation.record(Change::ClientChanged);
                    }
                }
                AppointmentEdit::Start { date_start } => {
                    if date_start != appointment.date_start {
                        appointment.date_start = date_start;
                        invalidation.record(Change::StartMoved);
                    }
                }
                AppointmentEdit::Notes { notes } => appointment.notes = notes,
                AppointmentEdit::AddService { service_id } => {
                    let service = self.bookable_service(&service_id)?;
                    appointment.add_line(&service);
                    invalidation.record(Change::LinesEdited);
                }
                AppointmentEdit::ReplaceService {
                    line_id,
                    service_id,
                } => {
                    let service = match service_id {
                        Some(service_id) => Some(self.bookable_service(&service_id)?),
                        None => None,
                    };
                    line_of(&mut appointment, line_id)?.set_service(service.as_ref());
                    invalidation.record(Change::LinesEdited);
                }
                AppointmentEdit::LinePrice {
                    line_id,
                    price_unit,
                } => {
                    line_of(&mut appointment, line_id)?.price_unit = price_unit;
                    invalidation.record(Change::LinesEdited);
                }
                AppointmentEdit::LineDuration { line_id, duration } => {
                    line_of(&mut appointment, line_id)?.duration = duration;
                    invalidation.record(Change::LinesEdited);
                }
                AppointmentEdit::RemoveLine { line_id } => {
                    if appointment.remove_line(line_id).is_none() {
                        return Err(missing_line(&appointment.id, line_id).into());
                    }
                    invalidation.record(Change::LinesEdited);
                }
            }
        }

        let changes: Vec<Change> = invalidation.changes().collect();
        let committed = self.commit(appointment, Some(previous_client), &invalidation)?;
        tracing::info!(appointment = %committed.id, ?changes, "appointment updated");
        Ok(committed)
    }

    /// Move an appointment along its lifecycle.
    ///
    /// Leaving `cancelled` puts the appointment back on the calendar, so the
    /// overlap check runs again and a reset into a slot taken meanwhile fails.
    pub fn transition(
        &mut self,
        id: &str,
        transition: Transition,
    ) -> Result<Appointment, SalonError> {
        let result = self.try_transition(id, transition);
        if let Err(err) = &result {
            tracing::warn!(appointment = id, %transition, %err, "transition rejected");
        }
        result
    }

    fn try_transition(
        &mut self,
        id: &str,
        transition: Transition,
    ) -> Result<Appointment, SalonError> {
        let mut appointment = self.appointment(id)?;
        let from = appointment.state;
        appointment.apply_transition(transition)?;
        let committed = self.commit(
            appointment,
            None,
            &Invalidation::of(&[Change::StateChanged]),
        )?;
        tracing::info!(appointment = id, %transition, %from, to = %committed.state, "appointment transitioned");
        Ok(committed)
    }

    /// Remove an appointment together with its lines.
    pub fn delete_appointment(&mut self, id: &str) -> Result<Appointment, SalonError> {
        let removed = self
            .store
            .remove_appointment(id)
            .ok_or_else(|| SalonError::not_found(EntityKind::Appointment, id))?;
        self.run_derivation(Derivation::ClientLoyalty, &removed, None);
        tracing::info!(appointment = id, "appointment deleted");
        Ok(removed)
    }

    /// Recompute the stored loyalty counters of `client_id` and the discount
    /// of each of its appointments. Returns `None` for an unknown client.
    pub fn refresh_client(&mut self, client_id: &str) -> Option<LoyaltyStatus> {
        let mut client = self.store.client(client_id)?;
        let status = loyalty_status(&*self.store, client_id);
        if client.appointment_done_count != status.done_count
            || client.is_frequent_client != status.is_frequent
        {
            client.appointment_done_count = status.done_count;
            client.is_frequent_client = status.is_frequent;
            self.store.put_client(client);
            tracing::debug!(
                client = client_id,
                done = status.done_count,
                frequent = status.is_frequent,
                "client loyalty updated"
            );
        }

        let appointments = self
            .store
            .find_matching(&AppointmentFilter::new().for_client(client_id), None);
        for mut appointment in appointments {
            let before = (appointment.discount_amount, appointment.final_amount);
            let prior = prior_done_count(&*self.store, &appointment);
            appointment.apply_discount(prior);
            if before != (appointment.discount_amount, appointment.final_amount) {
                self.store.put_appointment(appointment);
            }
        }
        Some(status)
    }

    fn commit(
        &mut self,
        mut appointment: Appointment,
        previous_client: Option<String>,
        invalidation: &Invalidation,
    ) -> Result<Appointment, SalonError> {
        let derivations = invalidation.derivations();
        let (line_checks, checks): (Vec<Check>, Vec<Check>) = invalidation
            .checks()
            .into_iter()
            .partition(|check| *check == Check::Lines);
        // Line values feed the derived totals and end time.
        for check in line_checks {
            self.run_check(check, &appointment)?;
        }
        for derivation in &derivations {
            self.derive_local(*derivation, &mut appointment)?;
        }
        for check in checks {
            tracing::debug!(appointment = %appointment.id, ?check, "running check");
            self.run_check(check, &appointment)?;
        }

        let id = appointment.id.clone();
        self.store.put_appointment(appointment.clone());
        if derivations.contains(&Derivation::ClientLoyalty) {
            self.run_derivation(Derivation::ClientLoyalty, &appointment, previous_client);
        }
        Ok(self.store.appointment(&id).unwrap_or(appointment))
    }

    fn derive_local(
        &self,
        derivation: Derivation,
        appointment: &mut Appointment,
    ) -> Result<(), SalonError> {
        match derivation {
            Derivation::Totals => appointment.recompute_totals(),
            Derivation::EndTime => appointment.recompute_end()?,
            Derivation::Reference => {
                let name = self
                    .store
                    .client(&appointment.client_id)
                    .map(|client| client.name);
                appointment.refresh_reference(name.as_deref(), &self.zone);
            }
            Derivation::Discount => {
                let prior = prior_done_count(&*self.store, appointment);
                appointment.apply_discount(prior);
            }
            Derivation::ClientLoyalty => {}
        }
        Ok(())
    }

    /// Store-wide derivations that run after the appointment is written.
    fn run_derivation(
        &mut self,
        derivation: Derivation,
        appointment: &Appointment,
        previous_client: Option<String>,
    ) {
        if derivation != Derivation::ClientLoyalty {
            return;
        }
        self.refresh_client(&appointment.client_id);
        if let Some(previous) = previous_client.filter(|p| *p != appointment.client_id) {
            self.refresh_client(&previous);
        }
    }

    fn run_check(&self, check: Check, appointment: &Appointment) -> Result<(), SalonError> {
        match check {
            Check::Lines => {
                for line in &appointment.lines {
                    line.validate()?;
                }
            }
            Check::ActiveStylist => {
                let stylist = self
                    .store
                    .stylist(&appointment.stylist_id)
                    .ok_or_else(|| {
                        SalonError::not_found(EntityKind::Stylist, &appointment.stylist_id)
                    })?;
                if !stylist.active {
                    return Err(ValidationError::InactiveStylist { name: stylist.name }.into());
                }
            }
            Check::BusinessHours => check_business_hours(
                self.store.schedule().as_ref(),
                appointment.local_start(&self.zone),
                appointment.local_end(&self.zone),
            )?,
            Check::Overlap => check_stylist_overlap(&*self.store, appointment, &self.zone)?,
        }
        Ok(())
    }

    fn bookable_service(&self, service_id: &str) -> Result<Service, SalonError> {
        let service = self
            .store
            .service(service_id)
            .ok_or_else(|| SalonError::not_found(EntityKind::Service, service_id))?;
        if !service.active {
            return Err(ValidationError::InactiveService { name: service.name }.into());
        }
        Ok(service)
    }

    // ── Schedule policy ───────────────────────────────────────────

    pub fn schedule(&self) -> Option<SchedulePolicy> {
        self.store.schedule()
    }

    /// Draft and confirmed appointments; any of them locks the schedule.
    pub fn active_appointment_count(&self) -> usize {
        self.store
            .count_matching(&AppointmentFilter::new().in_states(&AppointmentState::ACTIVE))
    }

    pub fn has_active_appointments(&self) -> bool {
        self.active_appointment_count() > 0
    }

    /// Create the singleton schedule.
    pub fn configure_schedule(
        &mut self,
        policy: SchedulePolicy,
    ) -> Result<SchedulePolicy, SalonError> {
        if self.store.schedule().is_some() {
            tracing::warn!("schedule already configured");
            return Err(PolicyError::ScheduleAlreadyExists.into());
        }
        policy.validate()?;
        self.store.put_schedule(Some(policy.clone()));
        tracing::info!(name = %policy.name, "schedule configured");
        Ok(policy)
    }

    pub fn update_schedule(&mut self, patch: SchedulePatch) -> Result<SchedulePolicy, SalonError> {
        let mut policy = self
            .store
            .schedule()
            .ok_or(PolicyError::NoScheduleConfigured)?;
        let active_count = self.active_appointment_count();
        if active_count > 0 {
            tracing::warn!(active_count, "schedule locked by active appointments");
            return Err(PolicyError::ScheduleLocked { active_count }.into());
        }
        patch.apply(&mut policy);
        policy.validate()?;
        self.store.put_schedule(Some(policy.clone()));
        tracing::info!(name = %policy.name, "schedule updated");
        Ok(policy)
    }

    /// The schedule is never deleted.
    pub fn delete_schedule(&mut self) -> Result<(), SalonError> {
        Err(PolicyError::ScheduleIsProtected.into())
    }

    // ── Snapshot replacement ──────────────────────────────────────

    /// Vet `replacement` as the new contents of this salon's store.
    ///
    /// The replacement must keep a configured schedule, may only change it
    /// while nothing is active here, and each of its draft or confirmed
    /// appointments must pass the booking checks against its own records.
    pub fn check_replacement<R: SalonStore + ?Sized>(
        &self,
        replacement: &R,
    ) -> Result<(), SalonError> {
        let current = self.store.schedule();
        let incoming = replacement.schedule();
        match (&current, &incoming) {
            (Some(_), None) => return Err(PolicyError::ScheduleIsProtected.into()),
            (_, Some(policy)) if incoming != current => {
                let active_count = self.active_appointment_count();
                if active_count > 0 {
                    return Err(PolicyError::ScheduleLocked { active_count }.into());
                }
                policy.validate()?;
            }
            _ => {}
        }

        let active = AppointmentFilter::new().in_states(&AppointmentState::ACTIVE);
        for appointment in replacement.find_matching(&active, None) {
            for line in &appointment.lines {
                line.validate()?;
            }
            check_business_hours(
                incoming.as_ref(),
                appointment.local_start(&self.zone),
                appointment.local_end(&self.zone),
            )?;
            check_stylist_overlap(replacement, &appointment, &self.zone)?;
        }
        tracing::debug!(
            appointments = replacement.count_matching(&AppointmentFilter::new()),
            "replacement snapshot vetted"
        );
        Ok(())
    }
}

fn missing_line(appointment: &str, line: u32) -> ValidationError {
    ValidationError::InvalidLine {
        appointment: appointment.to_string(),
        line,
        reason: "no such line".to_string(),
    }
}

fn line_of(
    appointment: &mut Appointment,
    line_id: u32,
) -> Result<&mut crate::line::AppointmentLine, ValidationError> {
    let id = appointment.id.clone();
    appointment
        .line_mut(line_id)
        .ok_or_else(|| missing_line(&id, line_id))
}
