//! Foreground watch loop: polls the timer record, drives the
//! persistent notification, and feeds button presses back into the
//! engine. Runs until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use fieldlog_core::storage::{Database, NewActivity, TimerStore};
use fieldlog_core::{
    ActionDispatcher, ActivityLog, ChannelSink, Config, NotificationBridge, NotifyGate,
    NotifyMessage, StorageError, TimerAction, TimerEngine, TimerWatcher,
};
use tokio::sync::mpsc;

use crate::notifier::Notifier;

/// Stands in for the activity log when the database could not be
/// opened. Saves fail loudly instead of silently dropping a session.
struct UnavailableLog;

impl ActivityLog for UnavailableLog {
    fn record_activity(&self, _activity: NewActivity) -> Result<String, StorageError> {
        Err(StorageError::Unavailable(
            "activity database not open".to_string(),
        ))
    }
}

pub fn run(
    store: Arc<dyn TimerStore>,
    db: Option<Arc<Database>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch_loop(store, db))
}

async fn watch_loop(
    store: Arc<dyn TimerStore>,
    db: Option<Arc<Database>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let engine = TimerEngine::new(store.clone());

    let activities: Arc<dyn ActivityLog> = match &db {
        Some(db) => db.clone(),
        None => Arc::new(UnavailableLog),
    };
    let dispatcher = ActionDispatcher::new(engine.clone(), activities);

    // Config is re-read on every push, so toggling notifications off
    // takes effect without restarting the watch loop.
    let gate: Arc<dyn NotifyGate> = Arc::new(|| {
        let cfg = Config::load_or_default();
        cfg.notifications.enabled && cfg.notifications.persistent_timer
    });
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
    let bridge = NotificationBridge::new(Arc::new(ChannelSink::new(msg_tx)), gate);

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<String>();
    let notifier = Notifier::new(action_tx);

    let watcher = TimerWatcher::spawn(store, Duration::from_millis(config.timer.poll_ms));
    let mut views = watcher.subscribe();
    let mut last = watcher.current();
    bridge.push(&last, true);

    tracing::info!("watching timer, Ctrl-C to exit");

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = *views.borrow_and_update();
                // State transitions bypass the update throttle.
                let forced =
                    view.is_running != last.is_running || view.is_paused != last.is_paused;
                bridge.push(&view, forced);
                last = view;
            }
            Some(msg) = msg_rx.recv() => {
                match msg {
                    NotifyMessage::Update { elapsed_seconds, is_running, is_paused } => {
                        notifier.update(elapsed_seconds, is_running, is_paused);
                    }
                    NotifyMessage::Hide => notifier.hide(),
                }
            }
            Some(id) = action_rx.recv() => {
                let action = TimerAction::from_action_id(&id);
                tracing::debug!("notification action: {}", action.as_str());
                dispatcher.dispatch(action);
                bridge.push(&engine.read(), true);
            }
            _ = tokio::signal::ctrl_c() => {
                notifier.hide();
                break;
            }
        }
    }

    Ok(())
}
