//! Timer engine implementation.
//!
//! The engine is a wall-clock-based state machine over the durable
//! [`TimerRecord`]. It holds no session state of its own: every
//! operation is a read-modify-write against the injected store, because
//! other execution contexts (another window, the notification host) may
//! have mutated the record since the last call. Last write wins; an
//! operation whose precondition no longer holds is a tolerated no-op,
//! never an error.
//!
//! ## State transitions
//!
//! ```text
//! Absent -> [start] -> Running <-> [pause/resume] <-> Paused
//! Running | Paused -> [stop | save] -> Absent
//! Running | Paused -> [reset] -> same state at zero
//! ```
//!
//! Mutating operations return `Some(Event)` when they changed state and
//! `None` when they no-opped, matching how callers fan events out.

use std::sync::Arc;

use chrono::Utc;

use crate::error::CoreError;
use crate::events::Event;
use crate::storage::{ActivityLog, NewActivity, TimerStore};

use super::record::{decimal_hours, format_hms, TimerRecord, TimerView};
use super::now_ms;

/// Core timer engine.
///
/// Cheap to clone; clones share the underlying store.
#[derive(Clone)]
pub struct TimerEngine {
    store: Arc<dyn TimerStore>,
}

impl TimerEngine {
    pub fn new(store: Arc<dyn TimerStore>) -> Self {
        Self { store }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current view of the session; the absent view when no record exists.
    pub fn read(&self) -> TimerView {
        self.read_at(now_ms())
    }

    pub fn read_at(&self, now_ms: u64) -> TimerView {
        self.load()
            .map(|r| r.view(now_ms))
            .unwrap_or_else(TimerView::absent)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let view = self.read();
        Event::StateSnapshot {
            elapsed_seconds: view.elapsed_seconds,
            is_running: view.is_running,
            is_paused: view.is_paused,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm a new session. No-op if a session already exists; there is
    /// never more than one.
    pub fn start(&self) -> Option<Event> {
        self.start_at(now_ms())
    }

    pub fn start_at(&self, now_ms: u64) -> Option<Event> {
        if self.load().is_some_and(|r| r.is_armed) {
            return None; // Already armed.
        }
        self.persist(&TimerRecord::started(now_ms));
        Some(Event::TimerStarted { at: Utc::now() })
    }

    /// Fold the running segment into the banked total and stop accruing.
    /// No-op if the session is paused or absent.
    pub fn pause(&self) -> Option<Event> {
        self.pause_at(now_ms())
    }

    pub fn pause_at(&self, now_ms: u64) -> Option<Event> {
        let record = self.load()?;
        if !record.is_running() {
            return None;
        }
        let folded = TimerRecord {
            accumulated_seconds: record.elapsed_seconds(now_ms),
            is_armed: true,
            run_started_at_epoch_ms: None,
        };
        self.persist(&folded);
        Some(Event::TimerPaused {
            elapsed_seconds: folded.accumulated_seconds,
            at: Utc::now(),
        })
    }

    /// Start a fresh running segment. No-op unless paused.
    pub fn resume(&self) -> Option<Event> {
        self.resume_at(now_ms())
    }

    pub fn resume_at(&self, now_ms: u64) -> Option<Event> {
        let record = self.load()?;
        if !record.is_paused() {
            return None;
        }
        let resumed = TimerRecord {
            run_started_at_epoch_ms: Some(now_ms),
            ..record
        };
        self.persist(&resumed);
        Some(Event::TimerResumed {
            elapsed_seconds: resumed.accumulated_seconds,
            at: Utc::now(),
        })
    }

    /// Discard the session without recording anything. No-op if absent.
    pub fn stop(&self) -> Option<Event> {
        if self.load().is_none() {
            return None; // Nothing to delete.
        }
        self.discard();
        Some(Event::TimerStopped { at: Utc::now() })
    }

    /// Zero the banked time but keep the session in its current state:
    /// a running session keeps running from zero, a paused one stays
    /// paused at zero. No-op if absent.
    pub fn reset(&self) -> Option<Event> {
        self.reset_at(now_ms())
    }

    pub fn reset_at(&self, now_ms: u64) -> Option<Event> {
        let record = self.load()?;
        if !record.is_armed {
            return None;
        }
        let was_running = record.is_running();
        let zeroed = TimerRecord {
            accumulated_seconds: 0,
            is_armed: true,
            run_started_at_epoch_ms: was_running.then_some(now_ms),
        };
        self.persist(&zeroed);
        Some(Event::TimerReset {
            is_running: was_running,
            at: Utc::now(),
        })
    }

    /// Bank the session as an activity entry, then stop.
    ///
    /// # Errors
    /// [`CoreError::NoSession`] if no session exists,
    /// [`CoreError::NothingToSave`] if the elapsed time is zero, or a
    /// storage error if the activity insert fails (the session is kept
    /// so the user can retry).
    pub fn save(&self, activities: &dyn ActivityLog) -> Result<Event, CoreError> {
        self.save_at(now_ms(), activities)
    }

    pub fn save_at(&self, now_ms: u64, activities: &dyn ActivityLog) -> Result<Event, CoreError> {
        let record = self.load().ok_or(CoreError::NoSession)?;
        let elapsed_seconds = record.elapsed_seconds(now_ms);
        if elapsed_seconds == 0 {
            return Err(CoreError::NothingToSave);
        }
        let hours = decimal_hours(elapsed_seconds);
        let activity_id = activities.record_activity(NewActivity {
            date: crate::storage::database::today(),
            hours,
            notes: format_hms(elapsed_seconds),
        })?;
        self.discard();
        Ok(Event::ActivitySaved {
            activity_id,
            hours,
            elapsed_seconds,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Fresh read; storage failures read as absent so a broken medium
    /// never panics an observer.
    fn load(&self) -> Option<TimerRecord> {
        match self.store.read() {
            Ok(record) => record.filter(|r| r.is_armed),
            Err(e) => {
                tracing::warn!("timer store read failed, treating as absent: {e}");
                None
            }
        }
    }

    fn persist(&self, record: &TimerRecord) {
        if let Err(e) = self.store.write(record) {
            tracing::warn!("timer store write failed, state is in-memory only: {e}");
        }
    }

    fn discard(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("timer store clear failed: {e}");
        }
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine").finish_non_exhaustive()
    }
}
