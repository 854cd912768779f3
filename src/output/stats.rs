//! Run statistics
//!
//! [`RunStats`] counts what happened during a live run. [`CrawlStatistics`]
//! is the same picture reloaded from the storage layer after the fact.

use crate::output::record::LinkRecord;
use crate::storage::{RunRecord, Storage};
use crate::CheckerError;
use std::collections::BTreeMap;

/// Counters collected while a crawl runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Tasks that were fetched
    pub dispatched: u64,

    /// Tasks dropped because their URL was already visited
    pub discarded: u64,

    /// Candidate links dropped because they did not resolve to a valid URL
    pub rejected: u64,

    /// Candidate links dropped by a deny pattern
    pub denied: u64,

    /// Fetches that produced a response
    pub completed: u64,

    /// Fetches that failed at the transport level
    pub failed: u64,

    /// Emitted records grouped by status label
    pub records_by_status: BTreeMap<String, u64>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one emitted record
    pub fn record_emitted(&mut self, record: &LinkRecord) {
        *self
            .records_by_status
            .entry(record.status.label())
            .or_insert(0) += 1;
    }

    /// Total number of emitted records
    pub fn total_records(&self) -> u64 {
        self.records_by_status.values().sum()
    }
}

/// Statistics for a stored run
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub run: RunRecord,

    pub total_records: u64,

    /// Record counts by status label
    pub records_by_status: BTreeMap<String, u64>,
}

/// Loads statistics for one run from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `run_id` - The run to summarize
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(CheckerError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage, run_id: i64) -> Result<CrawlStatistics, CheckerError> {
    let run = storage.get_run(run_id)?;
    let total_records = storage.count_records(run_id)?;
    let records_by_status = storage.count_by_status(run_id)?;

    Ok(CrawlStatistics {
        run,
        total_records,
        records_by_status,
    })
}

fn print_status_counts(counts: &BTreeMap<String, u64>, total: u64) {
    let mut sorted: Vec<_> = counts.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (status, count) in sorted {
        let percentage = if total > 0 {
            (*count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
}

/// Prints stored run statistics to stdout
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  ID: {}", stats.run.id);
    println!("  Seed: {}", stats.run.seed_url);
    println!("  Status: {}", stats.run.status);
    println!("  Started: {}", stats.run.started_at);
    if let Some(finished) = &stats.run.finished_at {
        println!("  Finished: {}", finished);
    }
    println!();

    println!("Broken links recorded: {}", stats.total_records);
    if !stats.records_by_status.is_empty() {
        println!();
        println!("Records by Status:");
        print_status_counts(&stats.records_by_status, stats.total_records);
    }
}

/// Prints live run counters to stdout
pub fn print_run_stats(stats: &RunStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Traversal:");
    println!("  Fetches dispatched: {}", stats.dispatched);
    println!("  Responses received: {}", stats.completed);
    println!("  Transport failures: {}", stats.failed);
    println!("  Duplicates discarded: {}", stats.discarded);
    println!("  Invalid links skipped: {}", stats.rejected);
    println!("  Denied links skipped: {}", stats.denied);
    println!();

    let total = stats.total_records();
    println!("Broken links recorded: {}", total);
    if total > 0 {
        println!();
        println!("Records by Status:");
        print_status_counts(&stats.records_by_status, total);
    }
}
