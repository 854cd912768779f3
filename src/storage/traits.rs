//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::output::LinkRecord;
use crate::storage::{RunRecord, RunStatus};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Corrupt record {id}: {message}")]
    CorruptRecord { id: i64, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed to persist and query
/// the link records of crawl runs.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `seed_url` - The URL the run starts from
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, seed_url: &str, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recently created run, if any
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Sets the final status and finish time of a run
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Record Management =====

    /// Appends a link record to a run
    fn insert_record(&mut self, run_id: i64, record: &LinkRecord) -> StorageResult<()>;

    /// Gets all records of a run in insertion order
    fn get_records(&self, run_id: i64) -> StorageResult<Vec<LinkRecord>>;

    /// Counts the records of a run
    fn count_records(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts the records of a run grouped by status label
    fn count_by_status(&self, run_id: i64) -> StorageResult<BTreeMap<String, u64>>;
}
