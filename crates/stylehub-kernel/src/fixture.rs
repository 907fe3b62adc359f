//! Minimal vector-backed store for kernel unit tests.

use crate::appointment::Appointment;
use crate::catalog::{Client, Service, Stylist};
use crate::schedule::SchedulePolicy;
use crate::store::{AppointmentFilter, EntityKind, SalonStore};

#[derive(Debug, Default)]
pub(crate) struct VecStore {
    pub services: Vec<Service>,
    pub stylists: Vec<Stylist>,
    pub clients: Vec<Client>,
    pub appointments: Vec<Appointment>,
    pub schedule: Option<SchedulePolicy>,
}

fn upsert<T>(items: &mut Vec<T>, item: T, same: impl Fn(&T, &T) -> bool) {
    match items.iter().position(|existing| same(existing, &item)) {
        Some(index) => items[index] = item,
        None => items.push(item),
    }
}

impl SalonStore for VecStore {
    fn service(&self, id: &str) -> Option<Service> {
        self.services.iter().find(|s| s.id == id).cloned()
    }
    fn services(&self) -> Vec<Service> {
        self.services.clone()
    }
    fn stylist(&self, id: &str) -> Option<Stylist> {
        self.stylists.iter().find(|s| s.id == id).cloned()
    }
    fn stylists(&self) -> Vec<Stylist> {
        self.stylists.clone()
    }
    fn client(&self, id: &str) -> Option<Client> {
        self.clients.iter().find(|c| c.id == id).cloned()
    }
    fn clients(&self) -> Vec<Client> {
        self.clients.clone()
    }
    fn appointment(&self, id: &str) -> Option<Appointment> {
        self.appointments.iter().find(|a| a.id == id).cloned()
    }
    fn schedule(&self) -> Option<SchedulePolicy> {
        self.schedule.clone()
    }

    fn count_matching(&self, filter: &AppointmentFilter) -> usize {
        self.appointments.iter().filter(|a| filter.matches(a)).count()
    }

    fn find_matching(&self, filter: &AppointmentFilter, limit: Option<usize>) -> Vec<Appointment> {
        let mut found: Vec<Appointment> = self
            .appointments
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        found.sort_by(|a, b| (a.date_start, &a.id).cmp(&(b.date_start, &b.id)));
        found.truncate(limit.unwrap_or(usize::MAX));
        found
    }

    fn next_id(&self, kind: EntityKind) -> String {
        let ids: Vec<&str> = match kind {
            EntityKind::Service => self.services.iter().map(|s| s.id.as_str()).collect(),
            EntityKind::Stylist => self.stylists.iter().map(|s| s.id.as_str()).collect(),
            EntityKind::Client => self.clients.iter().map(|c| c.id.as_str()).collect(),
            EntityKind::Appointment => self.appointments.iter().map(|a| a.id.as_str()).collect(),
            EntityKind::Schedule => Vec::new(),
        };
        let last = ids
            .iter()
            .filter_map(|id| id.rsplit('-').next()?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        format!("{}-{}", kind.id_prefix(), last + 1)
    }

    fn put_service(&mut self, service: Service) {
        upsert(&mut self.services, service, |a, b| a.id == b.id);
    }
    fn put_stylist(&mut self, stylist: Stylist) {
        upsert(&mut self.stylists, stylist, |a, b| a.id == b.id);
    }
    fn put_client(&mut self, client: Client) {
        upsert(&mut self.clients, client, |a, b| a.id == b.id);
    }
    fn put_appointment(&mut self, appointment: Appointment) {
        upsert(&mut self.appointments, appointment, |a, b| a.id == b.id);
    }
    fn put_schedule(&mut self, schedule: Option<SchedulePolicy>) {
        self.schedule = schedule;
    }
    fn remove_appointment(&mut self, id: &str) -> Option<Appointment> {
        let index = self.appointments.iter().position(|a| a.id == id)?;
        Some(self.appointments.remove(index))
    }
}
