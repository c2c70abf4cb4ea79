use std::sync::Arc;

use clap::Subcommand;
use fieldlog_core::storage::{Database, MemoryTimerStore, SqliteTimerStore, TimerStore};
use fieldlog_core::timer::TimerEngine;
use fieldlog_core::ActivityLog;

#[derive(Subcommand)]
pub enum TimerCommand {
    /// Start the stopwatch (no-op if a session is already armed)
    Start,
    /// Pause the stopwatch, banking the elapsed seconds
    Pause,
    /// Resume a paused stopwatch
    Resume,
    /// Discard the session entirely
    Stop,
    /// Zero the elapsed time, keeping the run/pause state
    Reset,
    /// Record the session as a ministry activity and clear it
    Save,
    /// Print the current timer view as JSON
    Status,
    /// Run the foreground watch loop with a persistent notification
    Watch,
}

/// Falls back to an in-memory store when SQLite cannot be opened, so
/// the stopwatch still runs for the lifetime of this process.
pub fn open_store() -> (Arc<dyn TimerStore>, Option<Arc<Database>>) {
    match Database::open() {
        Ok(db) => {
            let db = Arc::new(db);
            (Arc::new(SqliteTimerStore::new(db.clone())), Some(db))
        }
        Err(e) => {
            tracing::warn!("database unavailable, timer state will not persist: {e}");
            (Arc::new(MemoryTimerStore::new()), None)
        }
    }
}

pub fn run(action: TimerCommand) -> Result<(), Box<dyn std::error::Error>> {
    let (store, db) = open_store();
    let engine = TimerEngine::new(store.clone());

    match action {
        TimerCommand::Start => print_outcome(&engine, engine.start())?,
        TimerCommand::Pause => print_outcome(&engine, engine.pause())?,
        TimerCommand::Resume => print_outcome(&engine, engine.resume())?,
        TimerCommand::Stop => print_outcome(&engine, engine.stop())?,
        TimerCommand::Reset => print_outcome(&engine, engine.reset())?,
        TimerCommand::Save => {
            let db = db.ok_or("cannot save: activity storage unavailable")?;
            let event = engine.save(db.as_ref() as &dyn ActivityLog)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerCommand::Status => {
            println!("{}", serde_json::to_string_pretty(&engine.read())?);
        }
        TimerCommand::Watch => super::watch::run(store, db)?,
    }

    Ok(())
}

/// Transitions print their event; no-ops print the current snapshot so
/// scripted callers always get state back.
fn print_outcome(
    engine: &TimerEngine,
    event: Option<fieldlog_core::Event>,
) -> Result<(), Box<dyn std::error::Error>> {
    match event {
        Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
        None => println!("{}", serde_json::to_string_pretty(&engine.snapshot())?),
    }
    Ok(())
}
