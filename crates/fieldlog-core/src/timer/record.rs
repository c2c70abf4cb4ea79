//! The durable timer record and its derived view.
//!
//! `TimerRecord` is the single source of truth for a timing session. It
//! is what gets persisted; elapsed time is always re-derived from it
//! plus the wall clock, never cached.

use serde::{Deserialize, Serialize};

/// Persisted state of the one timing session.
///
/// Invariant: `run_started_at_epoch_ms` is `Some` exactly while the
/// session is actively running; pausing folds the running segment into
/// `accumulated_seconds` and clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRecord {
    /// Seconds banked before the current running segment.
    pub accumulated_seconds: u64,
    /// True whenever a session exists (running or paused).
    pub is_armed: bool,
    /// Wall-clock start of the current running segment.
    pub run_started_at_epoch_ms: Option<u64>,
}

impl TimerRecord {
    /// A fresh record as `start()` creates it.
    pub fn started(now_ms: u64) -> Self {
        Self {
            accumulated_seconds: 0,
            is_armed: true,
            run_started_at_epoch_ms: Some(now_ms),
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_armed && self.run_started_at_epoch_ms.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.is_armed && self.run_started_at_epoch_ms.is_none()
    }

    /// Banked seconds plus the current running segment, if any.
    pub fn elapsed_seconds(&self, now_ms: u64) -> u64 {
        let running = match self.run_started_at_epoch_ms {
            Some(started) if self.is_armed => now_ms.saturating_sub(started) / 1000,
            _ => 0,
        };
        self.accumulated_seconds + running
    }

    /// Project into the read-only view UI surfaces render.
    pub fn view(&self, now_ms: u64) -> TimerView {
        TimerView {
            elapsed_seconds: self.elapsed_seconds(now_ms),
            is_running: self.is_running(),
            is_paused: self.is_paused(),
        }
    }
}

/// Denormalized snapshot of the session, recomputed at every poll.
/// The all-false zero value is the absent ("no timer") state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerView {
    pub elapsed_seconds: u64,
    pub is_running: bool,
    pub is_paused: bool,
}

impl TimerView {
    pub fn absent() -> Self {
        Self::default()
    }

    /// No session exists; observers render nothing.
    pub fn is_absent(&self) -> bool {
        !self.is_running && !self.is_paused
    }

    /// `HH:MM:SS`, zero-padded.
    pub fn clock(&self) -> String {
        format_hms(self.elapsed_seconds)
    }

    /// Fractional hours rounded to 2 decimals.
    pub fn decimal_hours(&self) -> f64 {
        decimal_hours(self.elapsed_seconds)
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_running {
            "running"
        } else if self.is_paused {
            "paused"
        } else {
            "stopped"
        }
    }
}

/// `HH:MM:SS`, zero-padded. Hours widen past two digits if they must.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Seconds as fractional hours, rounded to 2 decimals.
pub fn decimal_hours(total_seconds: u64) -> f64 {
    (total_seconds as f64 / 3600.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_record_accrues_from_run_start() {
        let record = TimerRecord::started(10_000);
        assert!(record.is_running());
        assert!(!record.is_paused());
        assert_eq!(record.elapsed_seconds(10_000), 0);
        assert_eq!(record.elapsed_seconds(140_000), 130);
        // Partial seconds truncate.
        assert_eq!(record.elapsed_seconds(11_999), 1);
    }

    #[test]
    fn paused_record_holds_banked_time() {
        let record = TimerRecord {
            accumulated_seconds: 130,
            is_armed: true,
            run_started_at_epoch_ms: None,
        };
        assert!(record.is_paused());
        assert_eq!(record.elapsed_seconds(999_999_999), 130);
    }

    #[test]
    fn clock_skew_does_not_underflow() {
        let record = TimerRecord::started(50_000);
        assert_eq!(record.elapsed_seconds(40_000), 0);
    }

    #[test]
    fn view_distinguishes_running_paused_absent() {
        let running = TimerRecord::started(0).view(5_000);
        assert!(running.is_running && !running.is_paused && !running.is_absent());

        let paused = TimerRecord {
            accumulated_seconds: 5,
            is_armed: true,
            run_started_at_epoch_ms: None,
        }
        .view(5_000);
        assert!(paused.is_paused && !paused.is_running);

        assert!(TimerView::absent().is_absent());
        assert_eq!(TimerView::absent().elapsed_seconds, 0);
    }

    #[test]
    fn formatting() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(130), "00:02:10");
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(360_000), "100:00:00");
        assert_eq!(decimal_hours(190), 0.05);
        assert_eq!(decimal_hours(3600), 1.0);
        assert_eq!(decimal_hours(6300), 1.75);
    }

    #[test]
    fn record_serde_shape_is_stable() {
        let record = TimerRecord::started(1_000);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"accumulated_seconds\":0"));
        assert!(json.contains("\"is_armed\":true"));
        assert!(json.contains("\"run_started_at_epoch_ms\":1000"));
        let back: TimerRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
