//! In-process polling observer over the timer store.
//!
//! Cross-context consistency comes from every surface re-reading the
//! durable record; within one process a single `TimerWatcher` owns that
//! poll loop and fans the derived view out over a watch channel, so
//! in-process consumers don't each run their own timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::storage::TimerStore;

use super::record::TimerView;
use super::now_ms;

/// Periodically re-reads the store and publishes the derived
/// [`TimerView`]. The poll task is aborted on drop.
pub struct TimerWatcher {
    rx: watch::Receiver<TimerView>,
    handle: JoinHandle<()>,
}

impl TimerWatcher {
    /// Spawn a poll loop with the given cadence. Must be called within
    /// a tokio runtime.
    pub fn spawn(store: Arc<dyn TimerStore>, period: Duration) -> Self {
        let (tx, rx) = watch::channel(read_view(store.as_ref()));
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.is_closed() {
                    break; // No receivers left.
                }
                let view = read_view(store.as_ref());
                // Only an actual change wakes consumers; an idle absent
                // or paused record produces no traffic between polls.
                tx.send_if_modified(|current| {
                    if *current == view {
                        false
                    } else {
                        *current = view;
                        true
                    }
                });
            }
        });
        Self { rx, handle }
    }

    /// A receiver that yields every published view. `watch` semantics:
    /// slow consumers only ever see the latest value, which is exactly
    /// right for a clock display.
    pub fn subscribe(&self) -> watch::Receiver<TimerView> {
        self.rx.clone()
    }

    /// Most recently polled view.
    pub fn current(&self) -> TimerView {
        *self.rx.borrow()
    }
}

impl Drop for TimerWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// One poll: a vanished or unreadable record renders as absent.
fn read_view(store: &dyn TimerStore) -> TimerView {
    match store.read() {
        Ok(Some(record)) => record.view(now_ms()),
        Ok(None) => TimerView::absent(),
        Err(e) => {
            tracing::debug!("timer poll failed, rendering absent: {e}");
            TimerView::absent()
        }
    }
}
