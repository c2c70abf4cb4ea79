//! SQLite-based activity storage.
//!
//! Provides persistent storage for:
//! - Logged ministry activities (hours, counters, notes)
//! - A key-value store for application state, including the durable
//!   timer record (see [`super::timer_store`])

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Months, NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;

use super::data_dir;

/// A logged activity entry. `hours` is fractional (e.g. 1.75).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: String,
    pub date: NaiveDate,
    pub hours: f64,
    pub placements: u32,
    pub video_showings: u32,
    pub return_visits: u32,
    pub studies: u32,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Input for a new activity entry. Counters not present here default to
/// zero; the timer's save path only ever supplies date, hours and notes.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub date: NaiveDate,
    pub hours: f64,
    pub notes: String,
}

/// Monthly aggregate over the activity log.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MonthTotals {
    pub entries: u64,
    pub hours: f64,
    pub placements: u64,
    pub video_showings: u64,
    pub return_visits: u64,
    pub studies: u64,
}

/// The activity-creation seam the timer engine writes through.
/// Tests substitute a recording fake.
pub trait ActivityLog: Send + Sync {
    /// Insert one activity entry and return its id.
    fn record_activity(&self, activity: NewActivity) -> Result<String, StorageError>;
}

/// SQLite database for the activity log and shared app state.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `~/.config/fieldlog/fieldlog.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let dir = data_dir()?;
        Self::open_at(&dir.join("fieldlog.db"))
    }

    /// Open the database at an explicit path (integration tests point
    /// this at a temp dir).
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn().execute_batch(
            "CREATE TABLE IF NOT EXISTS activities (
                id             TEXT PRIMARY KEY,
                date           TEXT NOT NULL,
                hours          REAL NOT NULL DEFAULT 0,
                placements     INTEGER NOT NULL DEFAULT 0,
                video_showings INTEGER NOT NULL DEFAULT 0,
                return_visits  INTEGER NOT NULL DEFAULT 0,
                studies        INTEGER NOT NULL DEFAULT 0,
                notes          TEXT NOT NULL DEFAULT '',
                created_at     TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_activities_date ON activities(date);",
        )?;
        Ok(())
    }

    /// Insert a full activity entry.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn insert_activity(&self, record: &ActivityRecord) -> Result<(), StorageError> {
        self.conn().execute(
            "INSERT INTO activities
                (id, date, hours, placements, video_showings, return_visits, studies, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id,
                record.date.format("%Y-%m-%d").to_string(),
                record.hours,
                record.placements,
                record.video_showings,
                record.return_visits,
                record.studies,
                record.notes,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// List the activities of one calendar month, oldest first.
    pub fn list_month(&self, year: i32, month: u32) -> Result<Vec<ActivityRecord>, StorageError> {
        let (from, to) = month_bounds(year, month)?;
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, date, hours, placements, video_showings, return_visits, studies, notes, created_at
             FROM activities
             WHERE date >= ?1 AND date < ?2
             ORDER BY date, created_at",
        )?;
        let rows = stmt.query_map(params![from, to], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, u32>(5)?,
                row.get::<_, u32>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, date, hours, placements, video_showings, return_visits, studies, notes, created_at) =
                row?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| StorageError::QueryFailed(e.to_string()))?
                .with_timezone(&Utc);
            records.push(ActivityRecord {
                id,
                date,
                hours,
                placements,
                video_showings,
                return_visits,
                studies,
                notes,
                created_at,
            });
        }
        Ok(records)
    }

    /// Aggregate totals for one calendar month.
    pub fn month_totals(&self, year: i32, month: u32) -> Result<MonthTotals, StorageError> {
        let (from, to) = month_bounds(year, month)?;
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT COUNT(*), COALESCE(SUM(hours), 0), COALESCE(SUM(placements), 0),
                    COALESCE(SUM(video_showings), 0), COALESCE(SUM(return_visits), 0),
                    COALESCE(SUM(studies), 0)
             FROM activities
             WHERE date >= ?1 AND date < ?2",
        )?;
        let totals = stmt.query_row(params![from, to], |row| {
            Ok(MonthTotals {
                entries: row.get::<_, u64>(0)?,
                hours: row.get::<_, f64>(1)?,
                placements: row.get::<_, u64>(2)?,
                video_showings: row.get::<_, u64>(3)?,
                return_visits: row.get::<_, u64>(4)?,
                studies: row.get::<_, u64>(5)?,
            })
        })?;
        Ok(totals)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn().execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a value from the kv store. Missing keys are fine.
    pub fn kv_delete(&self, key: &str) -> Result<(), StorageError> {
        self.conn()
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl ActivityLog for Database {
    fn record_activity(&self, activity: NewActivity) -> Result<String, StorageError> {
        let record = ActivityRecord {
            id: Uuid::new_v4().to_string(),
            date: activity.date,
            hours: activity.hours,
            placements: 0,
            video_showings: 0,
            return_visits: 0,
            studies: 0,
            notes: activity.notes,
            created_at: Utc::now(),
        };
        self.insert_activity(&record)?;
        Ok(record.id)
    }
}

/// `[first day of month, first day of next month)` as `%Y-%m-%d` strings.
fn month_bounds(year: i32, month: u32) -> Result<(String, String), StorageError> {
    let from = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| StorageError::QueryFailed(format!("invalid month: {year}-{month}")))?;
    let to = from + Months::new(1);
    Ok((
        from.format("%Y-%m-%d").to_string(),
        to.format("%Y-%m-%d").to_string(),
    ))
}

/// Today's local calendar date, the stamp `save()` uses.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;

    fn activity(date: NaiveDate, hours: f64) -> ActivityRecord {
        ActivityRecord {
            id: Uuid::new_v4().to_string(),
            date,
            hours,
            placements: 2,
            video_showings: 0,
            return_visits: 1,
            studies: 0,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn insert_and_query_month() {
        let db = Database::open_memory().unwrap();
        db.insert_activity(&activity(NaiveDate::from_ymd_opt(2026, 8, 12).unwrap(), 1.5))
            .unwrap();
        db.insert_activity(&activity(NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(), 2.0))
            .unwrap();
        db.insert_activity(&activity(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(), 4.0))
            .unwrap();

        let august = db.list_month(2026, 8).unwrap();
        assert_eq!(august.len(), 2);
        assert_eq!(august[0].date.day(), 12);

        let totals = db.month_totals(2026, 8).unwrap();
        assert_eq!(totals.entries, 2);
        assert!((totals.hours - 3.5).abs() < f64::EPSILON);
        assert_eq!(totals.placements, 4);
        assert_eq!(totals.return_visits, 2);
    }

    #[test]
    fn december_rolls_into_next_year() {
        let db = Database::open_memory().unwrap();
        db.insert_activity(&activity(NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(), 1.0))
            .unwrap();
        db.insert_activity(&activity(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(), 1.0))
            .unwrap();
        assert_eq!(db.list_month(2026, 12).unwrap().len(), 1);
        assert_eq!(db.list_month(2027, 1).unwrap().len(), 1);
    }

    #[test]
    fn record_activity_defaults_counters_to_zero() {
        let db = Database::open_memory().unwrap();
        let id = db
            .record_activity(NewActivity {
                date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
                hours: 0.05,
                notes: "00:03:10".to_string(),
            })
            .unwrap();
        let entries = db.list_month(2026, 8).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].placements, 0);
        assert_eq!(entries[0].studies, 0);
        assert_eq!(entries[0].notes, "00:03:10");
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        // Deleting an absent key is not an error.
        db.kv_delete("test").unwrap();
    }
}
