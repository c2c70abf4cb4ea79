mod engine;
mod record;
mod watcher;

pub use engine::TimerEngine;
pub use record::{decimal_hours, format_hms, TimerRecord, TimerView};
pub use watcher::TimerWatcher;

/// Milliseconds since the Unix epoch; the one wall-clock read point.
pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
