//! Notification bridge: projects the timer view into a persistent
//! notification owned by a background host.
//!
//! The host lives in its own execution context and has no access to our
//! memory; everything crosses as a typed [`NotifyMessage`]. Sends are
//! fire-and-forget -- the caller never blocks on a render having
//! happened, and a failed send only costs one refresh.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::NotifyError;
use crate::timer::{now_ms, TimerView};

use super::throttle::UpdateThrottle;

/// The one tag the timer notification lives under. Re-renders replace
/// the previous instance instead of stacking new ones.
pub const NOTIFICATION_TAG: &str = "fieldlog-timer";

/// Wire format between foreground contexts and the notification host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotifyMessage {
    Update {
        elapsed_seconds: u64,
        is_running: bool,
        is_paused: bool,
    },
    Hide,
}

impl NotifyMessage {
    pub fn update(view: &TimerView) -> Self {
        Self::Update {
            elapsed_seconds: view.elapsed_seconds,
            is_running: view.is_running,
            is_paused: view.is_paused,
        }
    }
}

/// Rendering strategy, fixed once at startup.
pub trait NotificationSink: Send + Sync {
    fn update_view(&self, view: &TimerView) -> Result<(), NotifyError>;
    fn hide_view(&self) -> Result<(), NotifyError>;
}

/// Worker variant: posts messages to a long-lived host task that owns
/// the actual rendering.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<NotifyMessage>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<NotifyMessage>) -> Self {
        Self { tx }
    }
}

impl NotificationSink for ChannelSink {
    fn update_view(&self, view: &TimerView) -> Result<(), NotifyError> {
        self.tx
            .send(NotifyMessage::update(view))
            .map_err(|_| NotifyError::ChannelClosed)
    }

    fn hide_view(&self) -> Result<(), NotifyError> {
        self.tx
            .send(NotifyMessage::Hide)
            .map_err(|_| NotifyError::ChannelClosed)
    }
}

/// Selected when the platform has no usable notification capability;
/// the rest of the system is unaffected.
pub struct NullSink;

impl NotificationSink for NullSink {
    fn update_view(&self, _view: &TimerView) -> Result<(), NotifyError> {
        Ok(())
    }

    fn hide_view(&self) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Settings gate, consulted on every update attempt rather than cached
/// at startup, so a user toggling notifications takes effect
/// immediately.
pub trait NotifyGate: Send + Sync {
    fn notifications_allowed(&self) -> bool;
}

impl<F> NotifyGate for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn notifications_allowed(&self) -> bool {
        self()
    }
}

/// Throttled, gated front door to the notification host.
pub struct NotificationBridge {
    sink: Arc<dyn NotificationSink>,
    gate: Arc<dyn NotifyGate>,
    throttle: Mutex<UpdateThrottle>,
    // Latched after a hide; an absent view only hides again once an
    // update has shown something in between.
    hidden: AtomicBool,
}

impl NotificationBridge {
    pub fn new(sink: Arc<dyn NotificationSink>, gate: Arc<dyn NotifyGate>) -> Self {
        Self {
            sink,
            gate,
            throttle: Mutex::new(UpdateThrottle::new()),
            hidden: AtomicBool::new(false),
        }
    }

    /// Push the current view toward the host. `forced` marks updates
    /// that follow a state transition and must not be throttled.
    pub fn push(&self, view: &TimerView, forced: bool) {
        self.push_at(now_ms(), view, forced);
    }

    pub fn push_at(&self, now_ms: u64, view: &TimerView, forced: bool) {
        if !self.gate.notifications_allowed() {
            return;
        }

        if view.is_absent() {
            // Terminal state: clear whatever is showing, exactly once
            // per transition. Observers keep polling the absent record.
            if self.hidden.swap(true, Ordering::AcqRel) {
                return;
            }
            if let Err(e) = self.sink.hide_view() {
                tracing::debug!("notification hide failed: {e}");
            }
            self.lock_throttle().reset();
            return;
        }
        self.hidden.store(false, Ordering::Release);

        if !self.lock_throttle().should_send_at(now_ms, forced) {
            return;
        }
        if let Err(e) = self.sink.update_view(view) {
            tracing::debug!("notification update failed: {e}");
        }
    }

    fn lock_throttle(&self) -> std::sync::MutexGuard<'_, UpdateThrottle> {
        self.throttle.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        updates: Mutex<Vec<NotifyMessage>>,
        hides: Mutex<u32>,
    }

    impl NotificationSink for RecordingSink {
        fn update_view(&self, view: &TimerView) -> Result<(), NotifyError> {
            self.updates.lock().unwrap().push(NotifyMessage::update(view));
            Ok(())
        }

        fn hide_view(&self) -> Result<(), NotifyError> {
            *self.hides.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn running(elapsed: u64) -> TimerView {
        TimerView {
            elapsed_seconds: elapsed,
            is_running: true,
            is_paused: false,
        }
    }

    #[test]
    fn routine_updates_are_throttled() {
        let sink = Arc::new(RecordingSink::default());
        let bridge = NotificationBridge::new(sink.clone(), Arc::new(|| true));

        bridge.push_at(0, &running(0), true); // first render after arming
        bridge.push_at(1_000, &running(1), false);
        bridge.push_at(2_000, &running(2), false);
        bridge.push_at(5_000, &running(5), false);

        let updates = sink.updates.lock().unwrap();
        assert_eq!(updates.len(), 2); // t=0 forced, t=5000 due
    }

    #[test]
    fn transition_updates_bypass_the_cooldown() {
        let sink = Arc::new(RecordingSink::default());
        let bridge = NotificationBridge::new(sink.clone(), Arc::new(|| true));

        bridge.push_at(0, &running(0), true);
        // User hits pause one second in.
        bridge.push_at(
            1_000,
            &TimerView {
                elapsed_seconds: 1,
                is_running: false,
                is_paused: true,
            },
            true,
        );
        assert_eq!(sink.updates.lock().unwrap().len(), 2);
    }

    #[test]
    fn absent_view_hides_instead_of_updating() {
        let sink = Arc::new(RecordingSink::default());
        let bridge = NotificationBridge::new(sink.clone(), Arc::new(|| true));

        bridge.push_at(0, &running(10), true);
        bridge.push_at(1_000, &TimerView::absent(), true);

        assert_eq!(sink.updates.lock().unwrap().len(), 1);
        assert_eq!(*sink.hides.lock().unwrap(), 1);
        // Hide reset the throttle, so the next session renders at once.
        bridge.push_at(1_500, &running(0), false);
        assert_eq!(sink.updates.lock().unwrap().len(), 2);
    }

    #[test]
    fn terminal_hide_is_sent_once_per_transition() {
        let sink = Arc::new(RecordingSink::default());
        let bridge = NotificationBridge::new(sink.clone(), Arc::new(|| true));

        bridge.push_at(0, &running(10), true);
        // The record stays absent across many polls.
        for tick in 1..=5u64 {
            bridge.push_at(tick * 1_000, &TimerView::absent(), false);
        }
        assert_eq!(*sink.hides.lock().unwrap(), 1);

        // A new session re-arms the hide for its own stop.
        bridge.push_at(10_000, &running(0), false);
        bridge.push_at(11_000, &TimerView::absent(), false);
        bridge.push_at(12_000, &TimerView::absent(), false);
        assert_eq!(*sink.hides.lock().unwrap(), 2);
    }

    #[test]
    fn disabled_gate_silences_everything() {
        let sink = Arc::new(RecordingSink::default());
        let enabled = Arc::new(AtomicBool::new(false));
        let gate = {
            let enabled = enabled.clone();
            Arc::new(move || enabled.load(Ordering::Relaxed))
        };
        let bridge = NotificationBridge::new(sink.clone(), gate);

        bridge.push_at(0, &running(0), true);
        bridge.push_at(1_000, &TimerView::absent(), true);
        assert!(sink.updates.lock().unwrap().is_empty());
        assert_eq!(*sink.hides.lock().unwrap(), 0);

        // The gate is re-read per attempt, not cached.
        enabled.store(true, Ordering::Relaxed);
        bridge.push_at(2_000, &running(2), false);
        assert_eq!(sink.updates.lock().unwrap().len(), 1);
    }

    #[test]
    fn null_sink_swallows_everything() {
        let bridge = NotificationBridge::new(Arc::new(NullSink), Arc::new(|| true));
        bridge.push_at(0, &running(1), true);
        bridge.push_at(1_000, &TimerView::absent(), true);
    }

    #[test]
    fn channel_sink_delivers_typed_messages() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx);

        sink.update_view(&running(42)).unwrap();
        sink.hide_view().unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            NotifyMessage::Update {
                elapsed_seconds: 42,
                is_running: true,
                is_paused: false
            }
        );
        assert_eq!(rx.try_recv().unwrap(), NotifyMessage::Hide);

        drop(rx);
        assert!(matches!(
            sink.update_view(&running(43)),
            Err(NotifyError::ChannelClosed)
        ));
    }

    #[test]
    fn message_wire_format() {
        let json = serde_json::to_string(&NotifyMessage::Hide).unwrap();
        assert_eq!(json, "{\"kind\":\"hide\"}");
        let json = serde_json::to_string(&NotifyMessage::update(&running(7))).unwrap();
        assert!(json.contains("\"kind\":\"update\""));
        assert!(json.contains("\"elapsed_seconds\":7"));
    }
}
