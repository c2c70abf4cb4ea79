//! Inbound action dispatch from the notification host.
//!
//! A button press on the notification arrives as a bare action id. The
//! dispatcher maps each id to exactly one engine call; if several
//! foreground contexts receive the same press, the engine's
//! read-modify-write no-ops make the duplicates harmless. Resulting
//! events go out on a broadcast bus so any in-process observer reacts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::CoreError;
use crate::events::Event;
use crate::storage::ActivityLog;
use crate::timer::TimerEngine;

/// Actions the notification host can send back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerAction {
    Pause,
    Resume,
    Save,
    Stop,
    /// Body tap / default action: bring the app forward, touch nothing.
    Open,
}

impl TimerAction {
    /// Map a platform action id to an action. Anything unrecognized,
    /// including the empty default-click id, is a plain open.
    pub fn from_action_id(id: &str) -> Self {
        match id {
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "save" => Self::Save,
            "stop" => Self::Stop,
            _ => Self::Open,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Save => "save",
            Self::Stop => "stop",
            Self::Open => "default",
        }
    }
}

/// Applies inbound actions to the engine and broadcasts the outcome.
pub struct ActionDispatcher {
    engine: TimerEngine,
    activities: Arc<dyn ActivityLog>,
    bus: broadcast::Sender<Event>,
}

impl ActionDispatcher {
    pub fn new(engine: TimerEngine, activities: Arc<dyn ActivityLog>) -> Self {
        let (bus, _) = broadcast::channel(32);
        Self {
            engine,
            activities,
            bus,
        }
    }

    /// Listen for events produced by dispatched actions.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Apply one inbound action. Returns the event it produced, `None`
    /// for no-ops (including `Open`, which never mutates timer state).
    pub fn dispatch(&self, action: TimerAction) -> Option<Event> {
        let event = match action {
            TimerAction::Pause => self.engine.pause(),
            TimerAction::Resume => self.engine.resume(),
            TimerAction::Stop => self.engine.stop(),
            TimerAction::Save => match self.engine.save(self.activities.as_ref()) {
                Ok(event) => Some(event),
                Err(CoreError::NothingToSave) | Err(CoreError::NoSession) => {
                    tracing::info!("save action ignored: nothing to save");
                    None
                }
                Err(e) => {
                    tracing::warn!("save action failed: {e}");
                    None
                }
            },
            TimerAction::Open => None,
        };

        if let Some(event) = &event {
            // Nobody listening is fine.
            let _ = self.bus.send(event.clone());
        }
        event
    }
}
