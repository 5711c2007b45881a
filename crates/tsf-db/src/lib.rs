//! Storage layer for tsf timesheets.
//!
//! Provides a [`Repository`] backed by `rusqlite`.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not
//! `Sync`. Share it behind a `Mutex` when several tasks need it.
//!
//! # Schema
//!
//! Dates are stored as `YYYYMMDD` integers so that range queries over weeks
//! and months are plain `BETWEEN` comparisons.
//!
//! Every entry of a saved timesheet is stored twice: once with
//! `pending = 0` (committed) and once with `pending = 1`. Drafts only
//! replace the pending copy. Holidays are stored with `holiday = 1` and the
//! description in `comment`; statistics queries skip them.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, Transaction, params};
use thiserror::Error;
use tsf_core::{
    Day, DayEntry, Month, Repository, StatisticRecord, Timesheet, Week, WorkItem,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            -- date, week_start, week_end: YYYYMMDD
            CREATE TABLE IF NOT EXISTS timesheet_data (
                date INTEGER PRIMARY KEY,
                week_start INTEGER NOT NULL,
                week_end INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS timesheet_entry_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timesheet_date INTEGER NOT NULL,
                holiday INTEGER NOT NULL DEFAULT 0,
                pending INTEGER NOT NULL DEFAULT 0,
                hours INTEGER NOT NULL DEFAULT 0,
                minutes INTEGER NOT NULL DEFAULT 0,
                comment TEXT NOT NULL DEFAULT '',
                task TEXT,
                category TEXT NOT NULL DEFAULT '',
                FOREIGN KEY (timesheet_date) REFERENCES timesheet_data(date) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_entries_date
                ON timesheet_entry_data(timesheet_date, pending);
            ",
        )?;
        Ok(())
    }

    fn records(&self, begin: Day, end: Day) -> Result<Vec<StatisticRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT category, hours, minutes, pending
            FROM timesheet_entry_data
            WHERE timesheet_date BETWEEN ?1 AND ?2 AND holiday = 0
            ORDER BY timesheet_date ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map(params![begin.as_key(), end.as_key()], |row| {
            Ok(StatisticRecord {
                category: row.get(0)?,
                hours: row.get(1)?,
                minutes: row.get(2)?,
                pending: row.get(3)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

fn ensure_timesheet(tx: &Transaction<'_>, day: Day) -> Result<(), DbError> {
    let week = day.week();
    tx.execute(
        "INSERT OR IGNORE INTO timesheet_data (date, week_start, week_end) VALUES (?1, ?2, ?3)",
        params![day.as_key(), week.begin.as_key(), week.end.as_key()],
    )?;
    Ok(())
}

fn insert_items(tx: &Transaction<'_>, timesheet: &Timesheet, pending: bool) -> Result<usize, DbError> {
    let mut stmt = tx.prepare(
        "
        INSERT INTO timesheet_entry_data
        (timesheet_date, holiday, pending, hours, minutes, comment, task, category)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )?;
    let date = timesheet.date().as_key();
    let mut inserted = 0;
    for item in timesheet.entries() {
        inserted += match item {
            WorkItem::Holiday(holiday) => {
                stmt.execute(params![date, true, pending, 0, 0, holiday.description, None::<String>, ""])?
            }
            WorkItem::Entry(entry) => stmt.execute(params![
                date,
                false,
                pending,
                entry.hours,
                entry.minutes,
                entry.comment,
                entry.task,
                entry.category,
            ])?,
        };
    }
    Ok(inserted)
}

impl Repository for Database {
    type Error = DbError;

    fn save(&mut self, timesheet: &Timesheet) -> Result<(), DbError> {
        let day = timesheet.date();
        let tx = self.conn.transaction()?;
        ensure_timesheet(&tx, day)?;
        tx.execute(
            "DELETE FROM timesheet_entry_data WHERE timesheet_date = ?1",
            params![day.as_key()],
        )?;
        let committed = insert_items(&tx, timesheet, false)?;
        let pending = insert_items(&tx, timesheet, true)?;
        tx.commit()?;
        tracing::debug!(%day, committed, pending, "timesheet saved");
        Ok(())
    }

    fn pending_save(&mut self, timesheet: &Timesheet) -> Result<(), DbError> {
        let day = timesheet.date();
        let tx = self.conn.transaction()?;
        ensure_timesheet(&tx, day)?;
        tx.execute(
            "DELETE FROM timesheet_entry_data WHERE timesheet_date = ?1 AND pending = 1",
            params![day.as_key()],
        )?;
        let pending = insert_items(&tx, timesheet, true)?;
        tx.commit()?;
        tracing::debug!(%day, pending, "timesheet draft saved");
        Ok(())
    }

    fn daily(&self, day: Day) -> Result<Vec<StatisticRecord>, DbError> {
        self.records(day, day)
    }

    fn weekly(&self, week: Week) -> Result<Vec<StatisticRecord>, DbError> {
        self.records(week.begin, week.end)
    }

    fn monthly(&self, month: Month) -> Result<Vec<StatisticRecord>, DbError> {
        self.records(month.begin, month.end)
    }

    fn day_entries(&self, day: Day) -> Result<Vec<DayEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT category, hours, minutes, comment, task, pending
            FROM timesheet_entry_data
            WHERE timesheet_date = ?1 AND holiday = 0
            ORDER BY pending ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map(params![day.as_key()], |row| {
            Ok(DayEntry {
                category: row.get(0)?,
                hours: row.get(1)?,
                minutes: row.get(2)?,
                comment: row.get(3)?,
                task: row.get(4)?,
                pending: row.get(5)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsf_core::{Holiday, TimesheetEntry};

    fn day(value: &str) -> Day {
        Day::parse(value).unwrap()
    }

    fn entry(category: &str, hours: u8, minutes: u8, comment: &str) -> TimesheetEntry {
        TimesheetEntry {
            hours,
            minutes,
            comment: comment.to_string(),
            task: None,
            category: category.to_string(),
        }
    }

    fn timesheet(date: &str, entries: &[TimesheetEntry]) -> Timesheet {
        let mut timesheet = Timesheet::new(day(date));
        for e in entries {
            timesheet.add_entry(e.clone()).unwrap();
        }
        timesheet
    }

    fn row_count(db: &Database) -> i64 {
        db.conn
            .query_row("SELECT COUNT(*) FROM timesheet_entry_data", [], |row| row.get(0))
            .unwrap()
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");
        assert_eq!(
            table_columns(&db.conn, "timesheet_data"),
            vec!["date", "week_start", "week_end"]
        );
        assert_eq!(
            table_columns(&db.conn, "timesheet_entry_data"),
            vec![
                "id",
                "timesheet_date",
                "holiday",
                "pending",
                "hours",
                "minutes",
                "comment",
                "task",
                "category",
            ]
        );
    }

    #[test]
    fn save_writes_committed_and_pending_copies() {
        let mut db = Database::open_in_memory().unwrap();
        let ts = timesheet("2022-02-02", &[entry("aaa", 1, 0, "first"), entry("bbb", 2, 0, "x")]);
        db.save(&ts).unwrap();

        let records = db.daily(day("2022-02-02")).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records.iter().filter(|r| r.pending).count(), 2);
        let (week_start, week_end): (i64, i64) = db
            .conn
            .query_row(
                "SELECT week_start, week_end FROM timesheet_data WHERE date = 20220202",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!((week_start, week_end), (20_220_201, 20_220_206));
    }

    #[test]
    fn save_is_idempotent() {
        let mut db = Database::open_in_memory().unwrap();
        let ts = timesheet("2022-02-02", &[entry("aaa", 1, 0, "first")]);
        db.save(&ts).unwrap();
        let first = db.day_entries(day("2022-02-02")).unwrap();
        db.save(&ts).unwrap();

        assert_eq!(db.day_entries(day("2022-02-02")).unwrap(), first);
        assert_eq!(row_count(&db), 2);
    }

    #[test]
    fn pending_save_keeps_committed_rows() {
        let mut db = Database::open_in_memory().unwrap();
        let date = day("2022-02-02");
        db.save(&timesheet("2022-02-02", &[entry("aaa", 1, 0, "first")]))
            .unwrap();
        db.pending_save(&timesheet(
            "2022-02-02",
            &[entry("aaa", 1, 0, "first"), entry("aaa", 0, 30, "more")],
        ))
        .unwrap();

        let entries = db.day_entries(date).unwrap();
        let committed: Vec<_> = entries.iter().filter(|e| !e.pending).collect();
        let pending: Vec<_> = entries.iter().filter(|e| e.pending).collect();
        assert_eq!(committed.len(), 1);
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[1].comment, "more");
        assert_eq!(pending[1].minutes, 30);
    }

    #[test]
    fn holidays_are_stored_but_not_counted() {
        let mut db = Database::open_in_memory().unwrap();
        let mut ts = Timesheet::new(day("2021-12-25"));
        ts.add_holiday(Holiday::new("2021-12-25", "Christmas").unwrap())
            .unwrap();
        db.save(&ts).unwrap();

        assert_eq!(row_count(&db), 2);
        assert!(db.daily(day("2021-12-25")).unwrap().is_empty());
        assert!(db.day_entries(day("2021-12-25")).unwrap().is_empty());
    }

    #[test]
    fn task_round_trips_through_storage() {
        let mut db = Database::open_in_memory().unwrap();
        let mut with_task = entry("aaa", 1, 30, "review");
        with_task.task = Some("Task-7".to_string());
        db.save(&timesheet("2022-02-02", &[with_task])).unwrap();

        let entries = db.day_entries(day("2022-02-02")).unwrap();
        assert_eq!(entries[0].task.as_deref(), Some("Task-7"));
        assert_eq!(entries[0].description(), "Task-7 review");
    }

    #[test]
    fn weekly_and_monthly_ranges() {
        let mut db = Database::open_in_memory().unwrap();
        db.save(&timesheet("2025-03-28", &[entry("aaa", 1, 0, "fri")]))
            .unwrap();
        db.save(&timesheet("2025-03-31", &[entry("aaa", 2, 0, "mon")]))
            .unwrap();
        db.save(&timesheet("2025-04-01", &[entry("aaa", 4, 0, "tue")]))
            .unwrap();

        let week = day("2025-03-31").week();
        let weekly = db.weekly(week).unwrap();
        assert_eq!(weekly.len(), 2);
        assert!(weekly.iter().all(|r| r.hours == 2));

        let monthly = db.monthly(day("2025-03-31").month()).unwrap();
        let committed: u32 = monthly.iter().filter(|r| !r.pending).map(|r| r.hours).sum();
        assert_eq!(committed, 3);
    }

    #[test]
    fn file_database_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tsf.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.save(&timesheet("2022-02-02", &[entry("aaa", 1, 0, "first")]))
                .unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.daily(day("2022-02-02")).unwrap().len(), 2);
    }
}
