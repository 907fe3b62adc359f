//! Canonical in-memory salon state.
//!
//! Records are kept in `BTreeMap`s keyed by id, so iteration and JSONL
//! output are deterministic.

use crate::jsonl::{JsonlError, read_records_from_path, write_records_to_path};
use crate::record::{IdWatermark, Record};
use std::collections::BTreeMap;
use std::path::Path;
use stylehub_kernel::{
    Appointment, AppointmentFilter, Client, EntityKind, SalonStore, SchedulePolicy, Service,
    Stylist,
};

#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error(transparent)]
    Jsonl(#[from] JsonlError),

    #[error("snapshot holds more than one schedule record")]
    DuplicateSchedule,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    services: BTreeMap<String, Service>,
    stylists: BTreeMap<String, Stylist>,
    clients: BTreeMap<String, Client>,
    appointments: BTreeMap<String, Appointment>,
    schedule: Option<SchedulePolicy>,
    watermarks: BTreeMap<EntityKind, u64>,
}

fn id_suffix(id: &str) -> Option<u64> {
    id.rsplit_once('-')?.1.parse().ok()
}

impl MemoryStore {
    /// Build a store from records. Duplicate ids resolve last-write-wins;
    /// a second schedule record is rejected.
    pub fn from_records(records: Vec<Record>) -> Result<Self, MemoryStoreError> {
        let mut store = Self::default();
        for record in records {
            if matches!(record, Record::Schedule(_)) && store.schedule.is_some() {
                return Err(MemoryStoreError::DuplicateSchedule);
            }
            store.apply(record);
        }
        Ok(store)
    }

    /// Missing file means an empty store.
    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Self, MemoryStoreError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no snapshot yet, starting empty");
            return Ok(Self::default());
        }
        let records = read_records_from_path(path)?;
        let store = Self::from_records(records)?;
        tracing::debug!(path = %path.display(), records = store.len(), "snapshot loaded");
        Ok(store)
    }

    pub fn save_jsonl(&self, path: impl AsRef<Path>) -> Result<(), MemoryStoreError> {
        let path = path.as_ref();
        let records = self.records();
        write_records_to_path(path, &records)?;
        tracing::debug!(path = %path.display(), records = records.len(), "snapshot saved");
        Ok(())
    }

    /// Insert or replace one record.
    pub fn apply(&mut self, record: Record) {
        match record {
            Record::Service(service) => self.put_service(service),
            Record::Stylist(stylist) => self.put_stylist(stylist),
            Record::Client(client) => self.put_client(client),
            Record::Schedule(schedule) => self.put_schedule(Some(schedule)),
            Record::Appointment(appointment) => self.put_appointment(appointment),
            Record::Watermark(mark) => self.raise_watermark(mark.entity, mark.last),
        }
    }

    fn raise_watermark(&mut self, kind: EntityKind, suffix: u64) {
        let mark = self.watermarks.entry(kind).or_default();
        *mark = (*mark).max(suffix);
    }

    /// Remember the suffix of a removed id so `next_id` never reissues it.
    fn retire(&mut self, kind: EntityKind, id: &str) {
        if let Some(suffix) = id_suffix(id) {
            self.raise_watermark(kind, suffix);
        }
    }

    /// Remove one record; returns whether it existed.
    pub fn remove(&mut self, kind: EntityKind, id: &str) -> bool {
        let removed = match kind {
            EntityKind::Service => self.services.remove(id).is_some(),
            EntityKind::Stylist => self.stylists.remove(id).is_some(),
            EntityKind::Client => self.clients.remove(id).is_some(),
            EntityKind::Appointment => self.appointments.remove(id).is_some(),
            EntityKind::Schedule => return self.schedule.take().is_some(),
        };
        if removed {
            self.retire(kind, id);
        }
        removed
    }

    /// All records: services, stylists, clients, schedule, appointments,
    /// each group in id order, then the id watermarks.
    pub fn records(&self) -> Vec<Record> {
        let mut records = Vec::with_capacity(self.len());
        records.extend(self.services.values().cloned().map(Record::Service));
        records.extend(self.stylists.values().cloned().map(Record::Stylist));
        records.extend(self.clients.values().cloned().map(Record::Client));
        records.extend(self.schedule.clone().map(Record::Schedule));
        records.extend(self.appointments.values().cloned().map(Record::Appointment));
        records.extend(
            self.watermarks
                .iter()
                .map(|(entity, last)| Record::Watermark(IdWatermark {
                    entity: *entity,
                    last: *last,
                })),
        );
        records
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Service => self.services.len(),
            EntityKind::Stylist => self.stylists.len(),
            EntityKind::Client => self.clients.len(),
            EntityKind::Appointment => self.appointments.len(),
            EntityKind::Schedule => usize::from(self.schedule.is_some()),
        }
    }

    pub fn len(&self) -> usize {
        self.services.len()
            + self.stylists.len()
            + self.clients.len()
            + self.appointments.len()
            + usize::from(self.schedule.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ids(&self, kind: EntityKind) -> Box<dyn Iterator<Item = &String> + '_> {
        match kind {
            EntityKind::Service => Box::new(self.services.keys()),
            EntityKind::Stylist => Box::new(self.stylists.keys()),
            EntityKind::Client => Box::new(self.clients.keys()),
            EntityKind::Appointment => Box::new(self.appointments.keys()),
            EntityKind::Schedule => Box::new(std::iter::empty()),
        }
    }
}

impl SalonStore for MemoryStore {
    fn service(&self, id: &str) -> Option<Service> {
        self.services.get(id).cloned()
    }

    fn services(&self) -> Vec<Service> {
        self.services.values().cloned().collect()
    }

    fn stylist(&self, id: &str) -> Option<Stylist> {
        self.stylists.get(id).cloned()
    }

    fn stylists(&self) -> Vec<Stylist> {
        self.stylists.values().cloned().collect()
    }

    fn client(&self, id: &str) -> Option<Client> {
        self.clients.get(id).cloned()
    }

    fn clients(&self) -> Vec<Client> {
        self.clients.values().cloned().collect()
    }

    fn appointment(&self, id: &str) -> Option<Appointment> {
        self.appointments.get(id).cloned()
    }

    fn schedule(&self) -> Option<SchedulePolicy> {
        self.schedule.clone()
    }

    fn count_matching(&self, filter: &AppointmentFilter) -> usize {
        self.appointments
            .values()
            .filter(|appointment| filter.matches(appointment))
            .count()
    }

    fn find_matching(&self, filter: &AppointmentFilter, limit: Option<usize>) -> Vec<Appointment> {
        let mut found: Vec<&Appointment> = self
            .appointments
            .values()
            .filter(|appointment| filter.matches(appointment))
            .collect();
        found.sort_by(|a, b| (a.date_start, &a.id).cmp(&(b.date_start, &b.id)));
        found
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// One past the highest numeric suffix among existing and removed ids
    /// of `kind`.
    fn next_id(&self, kind: EntityKind) -> String {
        let last = self
            .ids(kind)
            .filter_map(|id| id_suffix(id))
            .chain(self.watermarks.get(&kind).copied())
            .max()
            .unwrap_or(0);
        format!("{}-{}", kind.id_prefix(), last + 1)
    }

    fn put_service(&mut self, service: Service) {
        self.services.insert(service.id.clone(), service);
    }

    fn put_stylist(&mut self, stylist: Stylist) {
        self.stylists.insert(stylist.id.clone(), stylist);
    }

    fn put_client(&mut self, client: Client) {
        self.clients.insert(client.id.clone(), client);
    }

    fn put_appointment(&mut self, appointment: Appointment) {
        self.appointments.insert(appointment.id.clone(), appointment);
    }

    fn put_schedule(&mut self, schedule: Option<SchedulePolicy>) {
        self.schedule = schedule;
    }

    fn remove_appointment(&mut self, id: &str) -> Option<Appointment> {
        let removed = self.appointments.remove(id)?;
        self.retire(EntityKind::Appointment, id);
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use stylehub_kernel::AppointmentState;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn appointment(id: &str, hour: u32) -> Appointment {
        let mut appointment = Appointment::new(id, "cli-1", "sty-1", at(hour));
        appointment.date_end = appointment.date_start + Duration::hours(1);
        appointment
    }

    #[test]
    fn next_id_follows_the_highest_suffix() {
        let mut store = MemoryStore::default();
        assert_eq!(store.next_id(EntityKind::Appointment), "apt-1");
        store.put_appointment(appointment("apt-1", 10));
        store.put_appointment(appointment("apt-10", 11));
        assert_eq!(store.next_id(EntityKind::Appointment), "apt-11");
        assert_eq!(store.next_id(EntityKind::Client), "cli-1");
    }

    #[test]
    fn removed_ids_are_never_reissued() {
        let mut store = MemoryStore::default();
        store.put_appointment(appointment("apt-1", 10));
        store.put_appointment(appointment("apt-2", 11));
        store.remove_appointment("apt-2").expect("apt-2 exists");
        assert_eq!(store.next_id(EntityKind::Appointment), "apt-3");

        let reloaded = MemoryStore::from_records(store.records()).expect("store should build");
        assert_eq!(reloaded.next_id(EntityKind::Appointment), "apt-3");
        assert_eq!(reloaded, store);
    }

    #[test]
    fn find_matching_orders_by_start_then_id() {
        let mut store = MemoryStore::default();
        store.put_appointment(appointment("apt-3", 12));
        store.put_appointment(appointment("apt-2", 10));
        store.put_appointment(appointment("apt-1", 12));

        let ids: Vec<String> = store
            .find_matching(&AppointmentFilter::new(), None)
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["apt-2", "apt-1", "apt-3"]);

        let first = store.find_matching(&AppointmentFilter::new(), Some(1));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "apt-2");
    }

    #[test]
    fn count_matching_applies_state_filters() {
        let mut store = MemoryStore::default();
        let mut cancelled = appointment("apt-1", 10);
        cancelled.state = AppointmentState::Cancelled;
        store.put_appointment(cancelled);
        store.put_appointment(appointment("apt-2", 11));

        let active = AppointmentFilter::new().in_states(&AppointmentState::ACTIVE);
        assert_eq!(store.count_matching(&active), 1);
        assert_eq!(store.count_matching(&AppointmentFilter::new()), 2);
    }

    #[test]
    fn duplicate_ids_use_last_write_wins() {
        let mut second = appointment("apt-1", 10);
        second.notes = "moved".to_string();
        let store = MemoryStore::from_records(vec![
            Record::Appointment(appointment("apt-1", 9)),
            Record::Appointment(second),
        ])
        .expect("store should build");
        assert_eq!(
            store.appointment("apt-1").expect("appointment exists").notes,
            "moved"
        );
    }

    #[test]
    fn second_schedule_record_is_rejected() {
        let err = MemoryStore::from_records(vec![
            Record::Schedule(SchedulePolicy::default()),
            Record::Schedule(SchedulePolicy::default()),
        ])
        .expect_err("schedule is a singleton");
        assert!(matches!(err, MemoryStoreError::DuplicateSchedule));
    }

    #[test]
    fn save_and_load_preserve_state() {
        let mut store = MemoryStore::default();
        store.put_schedule(Some(SchedulePolicy::default()));
        store.put_appointment(appointment("apt-1", 10));

        let unique = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "stylehub-memory-{}-{unique}.jsonl",
            std::process::id()
        ));
        store.save_jsonl(&path).expect("save should succeed");
        let loaded = MemoryStore::load_jsonl(&path).expect("load should succeed");
        assert_eq!(loaded, store);
        let _ = std::fs::remove_file(path);
    }
}
