//! Output module for link records, sinks and reports
//!
//! This module handles:
//! - The `LinkRecord` output shape and its status taxonomy
//! - Fanning records out to JSON and SQLite sinks
//! - The contact-link post-processing filter
//! - Run statistics and markdown summaries

mod emitter;
pub mod filter;
mod json;
mod markdown;
mod record;
mod sqlite_output;
pub mod stats;
mod traits;

pub use emitter::RecordEmitter;
pub use filter::{clean_file, filter_contact_records};
pub use json::{read_records, write_records, JsonOutputHandler};
pub use markdown::{format_markdown_summary, generate_markdown_summary, CrawlSummary};
pub use record::{ErrorTag, LinkRecord, RecordStatus};
pub use sqlite_output::{SharedStorage, SqliteOutputHandler};
pub use stats::{load_statistics, print_run_stats, print_statistics, CrawlStatistics, RunStats};
pub use traits::{OutputError, OutputHandler, OutputResult};

use crate::storage::{Storage, StorageError};
use crate::CheckerError;

/// Generates a crawl summary for the latest run in storage
///
/// # Arguments
///
/// * `storage` - The storage backend containing crawl data
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Successfully generated summary
/// * `Err(CheckerError)` - No run stored, or the query failed
pub fn generate_summary(storage: &dyn Storage) -> Result<CrawlSummary, CheckerError> {
    let run = storage.get_latest_run()?.ok_or_else(|| {
        StorageError::Database("No crawl runs found in database".to_string())
    })?;

    // Calculate duration if finished
    let duration_seconds = if let (Ok(started), Some(finished_str)) = (
        run.started_at.parse::<chrono::DateTime<chrono::Utc>>(),
        &run.finished_at,
    ) {
        if let Ok(finished) = finished_str.parse::<chrono::DateTime<chrono::Utc>>() {
            Some((finished - started).num_seconds().max(0) as u64)
        } else {
            None
        }
    } else {
        None
    };

    let records = storage.get_records(run.id)?;
    let records_by_status = storage.count_by_status(run.id)?;

    Ok(CrawlSummary {
        run_id: Some(run.id),
        seed_url: run.seed_url,
        started_at: Some(run.started_at),
        finished_at: run.finished_at,
        duration_seconds,
        status: run.status.to_db_string().to_string(),
        config_hash: Some(run.config_hash),
        stats: None,
        total_records: records.len() as u64,
        records_by_status,
        records,
    })
}
