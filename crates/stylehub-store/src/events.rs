//! Event log for snapshot migration and replay.
//!
//! `salon.event.v1` carries one upsert or removal per line. Migrating a
//! store yields events in snapshot order (reference records before the
//! appointments that point at them), and replay folds them back into an
//! equivalent [`MemoryStore`].

use crate::memory::MemoryStore;
use crate::record::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use stylehub_kernel::EntityKind;
use uuid::Uuid;

pub const SALON_EVENT_SCHEMA: &str = "salon.event.v1";
pub const SALON_SNAPSHOT_REF_PREFIX: &str = "salon.snapshot:";

fn default_schema() -> String {
    SALON_EVENT_SCHEMA.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SalonEventAction {
    Upsert { record: Record },
    Remove,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalonEvent {
    #[serde(default = "default_schema")]
    pub schema: String,
    pub event_id: String,
    pub entity: EntityKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub entity_id: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(flatten)]
    pub action: SalonEventAction,
}

impl SalonEvent {
    pub fn upsert(record: Record, occurred_at: DateTime<Utc>) -> Self {
        Self {
            schema: SALON_EVENT_SCHEMA.to_string(),
            event_id: Uuid::new_v4().to_string(),
            entity: record.entity(),
            entity_id: record.id().to_string(),
            occurred_at,
            action: SalonEventAction::Upsert { record },
        }
    }

    pub fn remove(entity: EntityKind, entity_id: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            schema: SALON_EVENT_SCHEMA.to_string(),
            event_id: Uuid::new_v4().to_string(),
            entity,
            entity_id: entity_id.into(),
            occurred_at,
            action: SalonEventAction::Remove,
        }
    }
}

pub fn read_events(reader: impl BufRead) -> Result<Vec<SalonEvent>, EventError> {
    let mut events = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| EventError::Io(line_no + 1, e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event: SalonEvent = serde_json::from_str(trimmed)
            .map_err(|e| EventError::Parse(line_no + 1, e.to_string()))?;
        events.push(event);
    }
    Ok(events)
}

pub fn write_events(writer: &mut impl Write, events: &[SalonEvent]) -> Result<(), EventError> {
    for event in events {
        let line =
            serde_json::to_string(event).map_err(|e| EventError::Serialize(e.to_string()))?;
        writeln!(writer, "{line}").map_err(|e| EventError::Io(0, e.to_string()))?;
    }
    Ok(())
}

pub fn read_events_from_path(path: impl AsRef<Path>) -> Result<Vec<SalonEvent>, EventError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| EventError::Io(0, format!("{}: {e}", path.display())))?;
    read_events(BufReader::new(file))
}

pub fn write_events_to_path(path: impl AsRef<Path>, events: &[SalonEvent]) -> Result<(), EventError> {
    let path = path.as_ref();
    let mut file =
        File::create(path).map_err(|e| EventError::Io(0, format!("{}: {e}", path.display())))?;
    write_events(&mut file, events)
}

/// One upsert per record, stamped with `occurred_at`.
pub fn migrate_store_to_events(store: &MemoryStore, occurred_at: DateTime<Utc>) -> Vec<SalonEvent> {
    store
        .records()
        .into_iter()
        .map(|record| SalonEvent::upsert(record, occurred_at))
        .collect()
}

pub fn replay_events(events: &[SalonEvent]) -> Result<MemoryStore, EventError> {
    let mut store = MemoryStore::default();
    for event in events {
        if event.schema != SALON_EVENT_SCHEMA {
            return Err(EventError::UnsupportedSchema(event.schema.clone()));
        }
        match &event.action {
            SalonEventAction::Upsert { record } => {
                if record.entity() != event.entity || record.id() != event.entity_id {
                    return Err(EventError::MismatchedEntity {
                        event_id: event.event_id.clone(),
                        envelope: format!("{}:{}", event.entity, event.entity_id),
                        payload: format!("{}:{}", record.entity(), record.id()),
                    });
                }
                store.apply(record.clone());
            }
            SalonEventAction::Remove if event.entity == EntityKind::Schedule => {
                return Err(EventError::ProtectedSchedule {
                    event_id: event.event_id.clone(),
                });
            }
            SalonEventAction::Remove => {
                if !store.remove(event.entity, &event.entity_id) {
                    return Err(EventError::UnknownRecord {
                        event_id: event.event_id.clone(),
                        entity: event.entity,
                        entity_id: event.entity_id.clone(),
                    });
                }
            }
        }
    }
    tracing::debug!(events = events.len(), records = store.len(), "event log replayed");
    Ok(store)
}

pub fn replay_events_from_path(path: impl AsRef<Path>) -> Result<MemoryStore, EventError> {
    let events = read_events_from_path(path)?;
    replay_events(&events)
}

pub fn stores_equivalent(left: &MemoryStore, right: &MemoryStore) -> bool {
    store_snapshot_ref(left) == store_snapshot_ref(right)
}

/// Content digest of the canonical snapshot: `salon.snapshot:<sha256 hex>`.
pub fn store_snapshot_ref(store: &MemoryStore) -> String {
    let mut hasher = Sha256::new();
    for record in store.records() {
        // Records are plain data; serialization does not fail.
        let line = serde_json::to_string(&record).unwrap_or_default();
        hasher.update(line.as_bytes());
        hasher.update([b'\n']);
    }
    format!("{SALON_SNAPSHOT_REF_PREFIX}{:x}", hasher.finalize())
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("line {0}: I/O error: {1}")]
    Io(usize, String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("unsupported event schema: {0}")]
    UnsupportedSchema(String),

    #[error("replay entity mismatch for event {event_id}: envelope={envelope}, payload={payload}")]
    MismatchedEntity {
        event_id: String,
        envelope: String,
        payload: String,
    },

    #[error("replay cannot remove the schedule (event {event_id})")]
    ProtectedSchedule { event_id: String },

    #[error("replay cannot remove unknown {entity} '{entity_id}' (event {event_id})")]
    UnknownRecord {
        event_id: String,
        entity: EntityKind,
        entity_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use stylehub_kernel::{Appointment, SalonStore, SchedulePolicy, Stylist};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn sample_store() -> MemoryStore {
        let mut store = MemoryStore::default();
        store.put_stylist(Stylist {
            id: "sty-1".to_string(),
            name: "Ana".to_string(),
            active: true,
            phone: String::new(),
            email: String::new(),
        });
        store.put_schedule(Some(SchedulePolicy::default()));
        store.put_appointment(Appointment::new("apt-1", "cli-1", "sty-1", at(10)));
        store
    }

    #[test]
    fn migrate_replay_roundtrip_is_equivalent() {
        let store = sample_store();
        let events = migrate_store_to_events(&store, at(12));
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].entity, EntityKind::Stylist);

        let replayed = replay_events(&events).expect("replay should succeed");
        assert!(stores_equivalent(&store, &replayed));
        assert!(store_snapshot_ref(&store).starts_with(SALON_SNAPSHOT_REF_PREFIX));
    }

    #[test]
    fn removal_events_drop_records() {
        let store = sample_store();
        let mut events = migrate_store_to_events(&store, at(12));
        events.push(SalonEvent::remove(EntityKind::Appointment, "apt-1", at(13)));

        let replayed = replay_events(&events).expect("replay should succeed");
        assert!(replayed.appointment("apt-1").is_none());
        assert!(!stores_equivalent(&store, &replayed));
    }

    #[test]
    fn removing_unknown_record_fails() {
        let events = vec![SalonEvent::remove(EntityKind::Client, "cli-9", at(12))];
        let err = replay_events(&events).expect_err("nothing to remove");
        assert!(matches!(err, EventError::UnknownRecord { .. }));
    }

    #[test]
    fn schedule_removal_is_refused() {
        let mut events = migrate_store_to_events(&sample_store(), at(12));
        events.push(SalonEvent::remove(EntityKind::Schedule, "", at(13)));
        let err = replay_events(&events).expect_err("schedule is protected");
        assert!(matches!(err, EventError::ProtectedSchedule { .. }));
    }

    #[test]
    fn rejects_foreign_schema() {
        let mut events = migrate_store_to_events(&sample_store(), at(12));
        events[0].schema = "salon.event.v0".to_string();
        let err = replay_events(&events).expect_err("schema mismatch");
        assert!(matches!(err, EventError::UnsupportedSchema(schema) if schema == "salon.event.v0"));
    }

    #[test]
    fn read_write_roundtrip_preserves_events() {
        let events = migrate_store_to_events(&sample_store(), at(12));
        let mut bytes = Vec::new();
        write_events(&mut bytes, &events).expect("event write should succeed");
        let parsed = read_events(std::io::Cursor::new(bytes)).expect("event read should succeed");
        assert_eq!(parsed, events);
    }
}
