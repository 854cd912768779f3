//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::output::{LinkRecord, RecordStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use crate::CheckerError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(CheckerError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, CheckerError> {
        let conn = init_database(path).map_err(StorageError::from)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, CheckerError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(StorageError::from)?;
        initialize_schema(&conn).map_err(StorageError::from)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        seed_url: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, seed_url: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (seed_url, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![seed_url, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let mut stmt = self.conn.prepare(
            "SELECT id, seed_url, started_at, finished_at, config_hash, status FROM runs WHERE id = ?1",
        )?;

        stmt.query_row(params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, seed_url, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
        )?;

        Ok(stmt.query_row([], run_from_row).optional()?)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Record Management =====

    fn insert_record(&mut self, run_id: i64, record: &LinkRecord) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO link_records
                (run_id, referer, response_url, status, status_code, link_url,
                 link_text, redirect_url, link_img, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                run_id,
                record.referer,
                record.response_url,
                record.status.label(),
                record.status.code(),
                record.link_url,
                record.link_text,
                record.redirect_url,
                record.link_img,
                now,
            ],
        )?;
        Ok(())
    }

    fn get_records(&self, run_id: i64) -> StorageResult<Vec<LinkRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, referer, response_url, status, link_url, link_text, redirect_url, link_img
             FROM link_records WHERE run_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![run_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(3)?,
                LinkRecord {
                    referer: row.get(1)?,
                    response_url: row.get(2)?,
                    status: RecordStatus::Code(0),
                    link_url: row.get(4)?,
                    link_text: row.get(5)?,
                    redirect_url: row.get(6)?,
                    link_img: row.get(7)?,
                },
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, label, mut record) = row?;
            record.status =
                RecordStatus::from_label(&label).ok_or_else(|| StorageError::CorruptRecord {
                    id,
                    message: format!("unknown status '{}'", label),
                })?;
            records.push(record);
        }

        Ok(records)
    }

    fn count_records(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM link_records WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_by_status(&self, run_id: i64) -> StorageResult<BTreeMap<String, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) FROM link_records WHERE run_id = ?1 GROUP BY status",
        )?;

        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let (status, count) = row?;
            counts.insert(status, count as u64);
        }

        Ok(counts)
    }
}

/// Initializes a database at the given path
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(Connection)` - Successfully opened/created database
/// * `Err(rusqlite::Error)` - Failed to open database
pub fn init_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
    ",
    )?;

    initialize_schema(&conn)?;

    Ok(conn)
}
