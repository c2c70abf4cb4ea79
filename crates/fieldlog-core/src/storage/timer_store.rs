//! Durable storage for the timer record.
//!
//! Every execution context that shows or mutates the timer goes through
//! a [`TimerStore`]; nothing holds the record in memory across
//! operations. There is no locking across contexts -- last write wins,
//! and the engine's read-modify-write discipline keeps races down to
//! harmless no-ops.

use std::sync::{Arc, Mutex};

use crate::error::StorageError;
use crate::timer::TimerRecord;

use super::database::Database;

/// kv key holding the serialized [`TimerRecord`].
pub const TIMER_RECORD_KEY: &str = "timer_record";

/// Legacy kv key holding only the banked seconds, kept in sync on every
/// write for older readers. Never read back here.
/// TODO: drop the dual write once the legacy month-view reader is gone.
pub const TIMER_BANKED_KEY: &str = "timer_banked_seconds";

/// Shared persistence seam for the timer record.
///
/// `read` returning `Ok(None)` is the ABSENT state. A record that fails
/// to parse also reads as absent rather than failing the caller.
pub trait TimerStore: Send + Sync {
    fn read(&self) -> Result<Option<TimerRecord>, StorageError>;
    fn write(&self, record: &TimerRecord) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// kv-table backed store, the production path.
pub struct SqliteTimerStore {
    db: Arc<Database>,
}

impl SqliteTimerStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl TimerStore for SqliteTimerStore {
    fn read(&self) -> Result<Option<TimerRecord>, StorageError> {
        let Some(json) = self.db.kv_get(TIMER_RECORD_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<TimerRecord>(&json) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!("malformed timer record, treating as absent: {e}");
                Ok(None)
            }
        }
    }

    fn write(&self, record: &TimerRecord) -> Result<(), StorageError> {
        let json = serde_json::to_string(record)
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        self.db.kv_set(TIMER_RECORD_KEY, &json)?;
        self.db
            .kv_set(TIMER_BANKED_KEY, &record.accumulated_seconds.to_string())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.db.kv_delete(TIMER_RECORD_KEY)?;
        self.db.kv_delete(TIMER_BANKED_KEY)?;
        Ok(())
    }
}

/// In-memory store: the test fake, and the degraded mode used when the
/// on-disk database cannot be opened. State lives only as long as the
/// process.
#[derive(Default)]
pub struct MemoryTimerStore {
    slot: Mutex<Option<TimerRecord>>,
}

impl MemoryTimerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimerStore for MemoryTimerStore {
    fn read(&self) -> Result<Option<TimerRecord>, StorageError> {
        Ok(self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn write(&self, record: &TimerRecord) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_until_written() {
        let store = SqliteTimerStore::new(Arc::new(Database::open_memory().unwrap()));
        assert!(store.read().unwrap().is_none());

        store.write(&TimerRecord::started(1_000)).unwrap();
        let record = store.read().unwrap().unwrap();
        assert_eq!(record.run_started_at_epoch_ms, Some(1_000));

        store.clear().unwrap();
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn write_keeps_legacy_banked_key_in_sync() {
        let db = Arc::new(Database::open_memory().unwrap());
        let store = SqliteTimerStore::new(db.clone());

        store
            .write(&TimerRecord {
                accumulated_seconds: 130,
                is_armed: true,
                run_started_at_epoch_ms: None,
            })
            .unwrap();
        assert_eq!(db.kv_get(TIMER_BANKED_KEY).unwrap().as_deref(), Some("130"));

        store.clear().unwrap();
        assert!(db.kv_get(TIMER_BANKED_KEY).unwrap().is_none());
        assert!(db.kv_get(TIMER_RECORD_KEY).unwrap().is_none());
    }

    #[test]
    fn malformed_record_reads_as_absent() {
        let db = Arc::new(Database::open_memory().unwrap());
        db.kv_set(TIMER_RECORD_KEY, "{not json").unwrap();
        let store = SqliteTimerStore::new(db);
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTimerStore::new();
        assert!(store.read().unwrap().is_none());
        store.write(&TimerRecord::started(5)).unwrap();
        assert!(store.read().unwrap().unwrap().is_running());
        store.clear().unwrap();
        assert!(store.read().unwrap().is_none());
    }
}
