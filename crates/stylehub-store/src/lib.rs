//! # stylehub-store
//!
//! Reference storage for the salon kernel.
//!
//! This crate provides:
//! - `MemoryStore`, the canonical in-memory state, implementing `SalonStore`
//! - JSONL snapshot read/write (one tagged record per line)
//! - lock-scoped atomic mutation of a snapshot file
//! - the `salon.event.v1` event log for migration and replay
//! - `SharedStore`, an in-process handle that serializes writers
//!
//! ## Data model
//!
//! ```text
//! salon.jsonl (one record per line)
//!     ↕  load / save
//! MemoryStore ──▶ SalonStore ──▶ Salon engine
//!     ↕  migrate / replay
//! salon.events.jsonl (salon.event.v1)
//! ```

pub mod atomic_store;
pub mod events;
pub mod jsonl;
pub mod memory;
pub mod record;
pub mod shared;

pub use atomic_store::{AtomicStoreMutationError, mutate_store_jsonl, store_lock_path};
pub use events::{
    EventError, SALON_EVENT_SCHEMA, SALON_SNAPSHOT_REF_PREFIX, SalonEvent, SalonEventAction,
    migrate_store_to_events, read_events, read_events_from_path, replay_events,
    replay_events_from_path, store_snapshot_ref, stores_equivalent, write_events,
    write_events_to_path,
};
pub use jsonl::{JsonlError, read_records, read_records_from_path, write_records, write_records_to_path};
pub use memory::{MemoryStore, MemoryStoreError};
pub use record::{IdWatermark, Record};
pub use shared::{SharedStore, SharedStoreError};
