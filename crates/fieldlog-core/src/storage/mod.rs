mod config;
pub mod database;
pub mod timer_store;

pub use config::{Config, NotificationsConfig, TimerConfig};
pub use database::{ActivityLog, ActivityRecord, Database, MonthTotals, NewActivity};
pub use timer_store::{MemoryTimerStore, SqliteTimerStore, TimerStore};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/fieldlog[-dev]/` based on FIELDLOG_ENV.
///
/// Set FIELDLOG_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FIELDLOG_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("fieldlog-dev")
    } else {
        base_dir.join("fieldlog")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::Unavailable(format!("cannot create {}: {e}", dir.display())))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_exists_after_resolution() {
        let dir = data_dir().unwrap();
        assert!(dir.is_dir());
        assert!(dir
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("fieldlog")));
    }
}
