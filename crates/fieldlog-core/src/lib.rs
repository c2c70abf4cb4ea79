//! # Fieldlog Core Library
//!
//! Core business logic for the fieldlog ministry-activity logger. All
//! operations are available through the standalone CLI binary; any GUI
//! front end is expected to be a thin layer over this same library.
//!
//! ## Architecture
//!
//! - **Timer**: a wall-clock stopwatch whose full state is persisted on
//!   every transition, so any process can reconstruct the elapsed time
//!   from the stored record alone
//! - **Storage**: SQLite-based activity and timer-record persistence and
//!   TOML-based configuration
//! - **Notify**: the persistent-notification pipeline (view throttling,
//!   sink abstraction, inbound action dispatch)
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: read-modify-write stopwatch operations
//! - [`TimerWatcher`]: polling observer that fans out [`TimerView`]s
//! - [`NotificationBridge`]: throttled push of views toward a sink
//! - [`Database`]: activity persistence and key-value storage
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, NotifyError, StorageError};
pub use events::Event;
pub use notify::{
    ActionDispatcher, ChannelSink, NotificationBridge, NotificationSink, NotifyGate, NotifyMessage,
    NullSink, TimerAction, UpdateThrottle, NOTIFICATION_TAG, UPDATE_COOLDOWN_MS,
};
pub use storage::{
    data_dir, ActivityLog, ActivityRecord, Config, Database, MemoryTimerStore, MonthTotals,
    NewActivity, NotificationsConfig, SqliteTimerStore, TimerConfig, TimerStore,
};
pub use timer::{decimal_hours, format_hms, TimerEngine, TimerRecord, TimerView, TimerWatcher};
