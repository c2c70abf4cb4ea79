//! Desktop notification host for the watch loop.
//!
//! Renders the timer as a single resident notification that is
//! replaced in place, and forwards button presses back to the caller
//! as raw action ids. Platforms without a freedesktop notification
//! daemon get a log-only stand-in.

#[cfg(all(unix, not(target_os = "macos")))]
pub use desktop::Notifier;

#[cfg(not(all(unix, not(target_os = "macos"))))]
pub use fallback::Notifier;

#[cfg(all(unix, not(target_os = "macos")))]
mod desktop {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use fieldlog_core::timer::format_hms;
    use fieldlog_core::NOTIFICATION_TAG;
    use notify_rust::{Hint, Notification, Timeout, Urgency};
    use tokio::sync::mpsc;

    // Fixed id so every show replaces the previous notification
    // instead of stacking a new one.
    const NOTIFICATION_ID: u32 = 0x4c47;

    pub struct Notifier {
        actions: mpsc::UnboundedSender<String>,
        waiting: Arc<AtomicBool>,
    }

    impl Notifier {
        pub fn new(actions: mpsc::UnboundedSender<String>) -> Self {
            Self {
                actions,
                waiting: Arc::new(AtomicBool::new(false)),
            }
        }

        pub fn update(&self, elapsed_seconds: u64, is_running: bool, is_paused: bool) {
            let mut notification = Notification::new();
            notification
                .appname(NOTIFICATION_TAG)
                .id(NOTIFICATION_ID)
                .summary("Ministry timer")
                .body(&format!(
                    "{}  ({})",
                    format_hms(elapsed_seconds),
                    if is_running { "running" } else { "paused" }
                ))
                .hint(Hint::Resident(true))
                .hint(Hint::SuppressSound(true))
                .urgency(Urgency::Low)
                .timeout(Timeout::Never);

            if is_running {
                notification.action("pause", "Pause");
            } else if is_paused {
                notification.action("resume", "Resume");
            }
            notification
                .action("save", "Save")
                .action("stop", "Stop")
                .action("default", "Open");

            match notification.show() {
                Ok(handle) => self.spawn_waiter(handle),
                Err(e) => tracing::warn!("notification show failed: {e}"),
            }
        }

        pub fn hide(&self) {
            // Replacing the resident notification with a transient one
            // is the portable way to dismiss by id.
            let result = Notification::new()
                .appname(NOTIFICATION_TAG)
                .id(NOTIFICATION_ID)
                .summary("Timer stopped")
                .hint(Hint::Transient(true))
                .timeout(Timeout::Milliseconds(1))
                .show();
            if let Err(e) = result {
                tracing::debug!("notification hide failed: {e}");
            }
        }

        /// At most one blocking waiter at a time; button presses on a
        /// replaced notification still carry the same id.
        fn spawn_waiter(&self, handle: notify_rust::NotificationHandle) {
            if self
                .waiting
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return;
            }
            let actions = self.actions.clone();
            let waiting = self.waiting.clone();
            std::thread::spawn(move || {
                handle.wait_for_action(|action| {
                    if action != "__closed" {
                        let _ = actions.send(action.to_owned());
                    }
                });
                waiting.store(false, Ordering::Release);
            });
        }
    }
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
mod fallback {
    use fieldlog_core::timer::format_hms;
    use tokio::sync::mpsc;

    pub struct Notifier {
        _actions: mpsc::UnboundedSender<String>,
    }

    impl Notifier {
        pub fn new(actions: mpsc::UnboundedSender<String>) -> Self {
            Self { _actions: actions }
        }

        pub fn update(&self, elapsed_seconds: u64, is_running: bool, is_paused: bool) {
            tracing::info!(
                "timer {} ({})",
                format_hms(elapsed_seconds),
                if is_running {
                    "running"
                } else if is_paused {
                    "paused"
                } else {
                    "stopped"
                }
            );
        }

        pub fn hide(&self) {
            tracing::info!("timer notification hidden");
        }
    }
}
