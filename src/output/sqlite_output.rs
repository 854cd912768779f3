//! SQLite-based output handler implementation
//!
//! This module provides an output handler that records link records
//! directly to the SQLite storage backend.

use crate::output::record::LinkRecord;
use crate::output::stats::RunStats;
use crate::output::traits::{OutputError, OutputHandler, OutputResult};
use crate::storage::{RunStatus, Storage};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Shared handle to a storage backend
pub type SharedStorage = Arc<Mutex<dyn Storage + Send>>;

/// SQLite-based output handler
///
/// Each record is inserted as it is emitted, so an interrupted run still
/// leaves everything found so far in the database.
pub struct SqliteOutputHandler {
    storage: SharedStorage,
    run_id: i64,
}

impl SqliteOutputHandler {
    /// Creates a handler for an existing run
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `run_id` - The current run ID
    pub fn new(storage: SharedStorage, run_id: i64) -> Self {
        Self { storage, run_id }
    }

    /// Creates a new run row and a handler writing into it
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `seed_url` - Seed URL of the run
    /// * `config_hash` - Hash of the configuration file
    pub fn start(storage: SharedStorage, seed_url: &str, config_hash: &str) -> OutputResult<Self> {
        let run_id = {
            let mut guard = storage
                .lock()
                .map_err(|e| OutputError::Write(format!("Failed to lock storage: {}", e)))?;
            guard.create_run(seed_url, config_hash)?
        };
        info!("Recording run {} to database", run_id);
        Ok(Self::new(storage, run_id))
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }
}

impl OutputHandler for SqliteOutputHandler {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn record(&mut self, record: &LinkRecord) -> OutputResult<()> {
        let mut storage = self
            .storage
            .lock()
            .map_err(|e| OutputError::Write(format!("Failed to lock storage: {}", e)))?;

        storage.insert_record(self.run_id, record)?;
        Ok(())
    }

    fn finalize(&mut self, status: RunStatus, _stats: &RunStats) -> OutputResult<()> {
        let mut storage = self
            .storage
            .lock()
            .map_err(|e| OutputError::Write(format!("Failed to lock storage: {}", e)))?;

        storage.finish_run(self.run_id, status)?;
        Ok(())
    }
}
