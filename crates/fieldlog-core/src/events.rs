use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every timer state change produces an Event.
/// UI surfaces subscribe to these; the notification bridge treats any
/// event as a forced render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        at: DateTime<Utc>,
    },
    TimerPaused {
        elapsed_seconds: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        elapsed_seconds: u64,
        at: DateTime<Utc>,
    },
    /// Accumulated time zeroed; the session keeps its running/paused state.
    TimerReset {
        is_running: bool,
        at: DateTime<Utc>,
    },
    /// Session discarded without recording an activity.
    TimerStopped {
        at: DateTime<Utc>,
    },
    /// Session banked into the activity log and then stopped.
    ActivitySaved {
        activity_id: String,
        hours: f64,
        elapsed_seconds: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        elapsed_seconds: u64,
        is_running: bool,
        is_paused: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Timestamp carried by the event, whatever the variant.
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at }
            | Event::TimerPaused { at, .. }
            | Event::TimerResumed { at, .. }
            | Event::TimerReset { at, .. }
            | Event::TimerStopped { at }
            | Event::ActivitySaved { at, .. }
            | Event::StateSnapshot { at, .. } => *at,
        }
    }
}
