//! In-process serialized store handle.

use crate::memory::MemoryStore;
use std::sync::{Arc, Mutex};

#[derive(Debug, thiserror::Error)]
pub enum SharedStoreError<E> {
    #[error("salon store lock poisoned by a panicked writer")]
    Poisoned,

    #[error("{0}")]
    Mutation(E),
}

/// Cloneable handle to one [`MemoryStore`] shared between threads.
///
/// Writers are serialized by a mutex. Each transaction mutates a private
/// copy that replaces the shared state only when the closure returns `Ok`,
/// so a rejected write leaves nothing behind.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<MemoryStore>>,
}

impl SharedStore {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn transact<T, E, F>(&self, mutation: F) -> Result<T, SharedStoreError<E>>
    where
        F: FnOnce(&mut MemoryStore) -> Result<T, E>,
    {
        let mut guard = self.inner.lock().map_err(|_| SharedStoreError::Poisoned)?;
        let mut draft = guard.clone();
        let value = mutation(&mut draft).map_err(SharedStoreError::Mutation)?;
        *guard = draft;
        Ok(value)
    }

    /// Run `read` against the current state.
    pub fn read<T>(&self, read: impl FnOnce(&MemoryStore) -> T) -> Result<T, SharedStoreError<std::convert::Infallible>> {
        let guard = self.inner.lock().map_err(|_| SharedStoreError::Poisoned)?;
        Ok(read(&guard))
    }

    pub fn snapshot(&self) -> Result<MemoryStore, SharedStoreError<std::convert::Infallible>> {
        self.read(MemoryStore::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};
    use std::thread;
    use stylehub_kernel::{
        AppointmentRequest, LineRequest, NewClient, NewService, NewStylist, Salon, SalonError,
        SalonStore, SchedulePolicy,
    };

    fn zone() -> FixedOffset {
        FixedOffset::east_opt(0).expect("valid offset")
    }

    fn seeded() -> SharedStore {
        let mut store = MemoryStore::default();
        let mut salon = Salon::new(&mut store, zone());
        salon
            .configure_schedule(SchedulePolicy::default())
            .expect("schedule");
        salon
            .add_service(NewService {
                name: "Cut".to_string(),
                description: String::new(),
                price: 20.0,
                duration: 1.0,
            })
            .expect("service");
        salon
            .add_stylist(NewStylist {
                name: "Ana".to_string(),
                ..NewStylist::default()
            })
            .expect("stylist");
        salon
            .add_client(NewClient {
                name: "Lucia".to_string(),
                ..NewClient::default()
            })
            .expect("client");
        SharedStore::new(store)
    }

    fn book(store: &mut MemoryStore) -> Result<String, SalonError> {
        let mut salon = Salon::new(store, zone());
        let start = NaiveDate::from_ymd_opt(2026, 10, 19)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .expect("valid timestamp");
        let date_start = salon.local_to_utc(start);
        salon
            .create_appointment(AppointmentRequest {
                client_id: "cli-1".to_string(),
                stylist_id: "sty-1".to_string(),
                date_start,
                lines: vec![LineRequest::service("svc-1")],
                notes: String::new(),
            })
            .map(|appointment| appointment.id)
    }

    #[test]
    fn concurrent_bookings_of_one_slot_admit_exactly_one() {
        let shared = seeded();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || shared.transact(book).is_ok())
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread should finish"))
            .filter(|ok| *ok)
            .count();
        assert_eq!(admitted, 1);

        let snapshot = shared.snapshot().expect("lock is healthy");
        assert_eq!(snapshot.find_matching(&Default::default(), None).len(), 1);
    }

    #[test]
    fn failed_transaction_discards_its_draft() {
        let shared = seeded();
        let result: Result<(), _> = shared.transact(|store| {
            store.put_schedule(None);
            Err("rejected")
        });
        assert!(matches!(result, Err(SharedStoreError::Mutation("rejected"))));
        let still_configured = shared
            .read(|store| store.schedule().is_some())
            .expect("lock is healthy");
        assert!(still_configured);
    }
}
