//! Output handler traits and error types
//!
//! This module defines the sink interface the record emitter fans out to.

use crate::output::record::LinkRecord;
use crate::output::stats::RunStats;
use crate::storage::{RunStatus, StorageError};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for output sinks
///
/// A handler sees every record in completion order, then exactly one
/// `finalize` call when the run ends (normally or by cancellation).
pub trait OutputHandler: Send {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Accepts one emitted record
    ///
    /// # Arguments
    ///
    /// * `record` - The record, already final
    fn record(&mut self, record: &LinkRecord) -> OutputResult<()>;

    /// Flushes buffered output and records the final run status
    ///
    /// # Arguments
    ///
    /// * `status` - The final status of the crawl run
    /// * `stats` - Counters collected during the run
    fn finalize(&mut self, status: RunStatus, stats: &RunStats) -> OutputResult<()>;
}
