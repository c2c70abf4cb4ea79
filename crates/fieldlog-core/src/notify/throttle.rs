//! Rate limit for outbound notification updates.
//!
//! Observers poll every second, but re-rendering an OS notification that
//! often floods the host. The throttle keeps a single last-sent stamp;
//! skipped updates are dropped, not queued -- the next poll supersedes
//! them with fresher data.

/// Minimum spacing between routine notification updates.
pub const UPDATE_COOLDOWN_MS: u64 = 5_000;

/// One last-sent timestamp, process-wide.
#[derive(Debug, Clone)]
pub struct UpdateThrottle {
    cooldown_ms: u64,
    last_sent_ms: Option<u64>,
}

impl UpdateThrottle {
    pub fn new() -> Self {
        Self::with_cooldown(UPDATE_COOLDOWN_MS)
    }

    pub fn with_cooldown(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            last_sent_ms: None,
        }
    }

    /// Whether an update may go out now, recording the send if so.
    ///
    /// A forced update (one that follows a state transition, or the
    /// first after a session is armed) always passes and refreshes the
    /// stamp, so the cooldown restarts from it.
    pub fn should_send_at(&mut self, now_ms: u64, forced: bool) -> bool {
        let due = match self.last_sent_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.cooldown_ms,
        };
        if forced || due {
            self.last_sent_ms = Some(now_ms);
            return true;
        }
        false
    }

    /// Forget the last send, e.g. after the notification was hidden.
    pub fn reset(&mut self) {
        self.last_sent_ms = None;
    }
}

impl Default for UpdateThrottle {
    fn default() -> Self {
        Self::new()
    }
}
