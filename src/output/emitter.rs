//! Record emitter
//!
//! Owns the ordered output sequence of a run and fans every record out to
//! the configured sinks. Sink failures are logged and never stop the run.

use crate::output::record::LinkRecord;
use crate::output::stats::RunStats;
use crate::output::traits::OutputHandler;
use crate::storage::RunStatus;
use tracing::{debug, warn};

/// Collects records in completion order and forwards them to handlers
#[derive(Default)]
pub struct RecordEmitter {
    records: Vec<LinkRecord>,
    handlers: Vec<Box<dyn OutputHandler>>,
}

impl RecordEmitter {
    /// Creates an emitter with no sinks; records are only kept in memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink, builder style
    pub fn with_handler(mut self, handler: Box<dyn OutputHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn add_handler(&mut self, handler: Box<dyn OutputHandler>) {
        self.handlers.push(handler);
    }

    /// Appends a record and hands it to every sink
    ///
    /// Records are never deduplicated.
    pub fn emit(&mut self, record: LinkRecord) {
        debug!(
            "Record {} for {} (referer {})",
            record.status, record.link_url, record.referer
        );

        for handler in &mut self.handlers {
            if let Err(e) = handler.record(&record) {
                warn!("Output handler '{}' failed to record: {}", handler.name(), e);
            }
        }

        self.records.push(record);
    }

    /// Records emitted so far, in completion order
    pub fn records(&self) -> &[LinkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finalizes every sink and returns the full record sequence
    pub fn finish(mut self, status: RunStatus, stats: &RunStats) -> Vec<LinkRecord> {
        for handler in &mut self.handlers {
            if let Err(e) = handler.finalize(status, stats) {
                warn!("Output handler '{}' failed to finalize: {}", handler.name(), e);
            }
        }
        self.records
    }
}
