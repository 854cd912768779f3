//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of a run:
//! run information, counters, and the broken links grouped by status.

use crate::output::record::LinkRecord;
use crate::output::stats::RunStats;
use crate::output::traits::OutputResult;
use crate::storage::RunStatus;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Everything the markdown report shows
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    // Run metadata
    pub run_id: Option<i64>,
    pub seed_url: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,
    pub status: String,
    pub config_hash: Option<String>,

    // Traversal counters, only known for a live run
    pub stats: Option<RunStats>,

    pub total_records: u64,
    pub records_by_status: BTreeMap<String, u64>,
    pub records: Vec<LinkRecord>,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a summary from a run that just finished in this process
    pub fn from_run(
        seed_url: &str,
        status: RunStatus,
        stats: &RunStats,
        records: &[LinkRecord],
    ) -> Self {
        Self {
            seed_url: seed_url.to_string(),
            status: status.to_db_string().to_string(),
            stats: Some(stats.clone()),
            total_records: records.len() as u64,
            records_by_status: stats.records_by_status.clone(),
            records: records.to_vec(),
            ..Self::default()
        }
    }

    /// Share of dispatched fetches that produced a record, as a percentage
    pub fn broken_rate(&self) -> f64 {
        match &self.stats {
            Some(stats) if stats.dispatched > 0 => {
                (self.total_records as f64 / stats.dispatched as f64) * 100.0
            }
            _ => 0.0,
        }
    }
}

/// Generates a markdown summary file
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Broken Link Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    if let Some(run_id) = summary.run_id {
        md.push_str(&format!("- **Run ID**: {}\n", run_id));
    }
    md.push_str(&format!("- **Seed URL**: {}\n", summary.seed_url));
    if let Some(started) = &summary.started_at {
        md.push_str(&format!("- **Started**: {}\n", started));
    }
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", summary.status));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    if let Some(stats) = &summary.stats {
        md.push_str(&format!("- **Fetches Dispatched**: {}\n", stats.dispatched));
        md.push_str(&format!("- **Responses**: {}\n", stats.completed));
        md.push_str(&format!("- **Transport Failures**: {}\n", stats.failed));
        md.push_str(&format!("- **Duplicates Discarded**: {}\n", stats.discarded));
        md.push_str(&format!("- **Invalid Links Skipped**: {}\n", stats.rejected));
        md.push_str(&format!("- **Denied Links Skipped**: {}\n", stats.denied));
    }
    md.push_str(&format!("- **Broken Links**: {}\n", summary.total_records));
    if summary.stats.is_some() {
        md.push_str(&format!("- **Broken Rate**: {:.2}%\n", summary.broken_rate()));
    }
    md.push('\n');

    if !summary.records_by_status.is_empty() {
        md.push_str("## Records by Status\n\n");
        md.push_str("| Status | Count |\n");
        md.push_str("|--------|-------|\n");
        for (status, count) in &summary.records_by_status {
            md.push_str(&format!("| {} | {} |\n", status, count));
        }
        md.push('\n');
    }

    // One table per status, in label order
    let mut grouped: BTreeMap<String, Vec<&LinkRecord>> = BTreeMap::new();
    for record in &summary.records {
        grouped.entry(record.status.label()).or_default().push(record);
    }

    for (status, records) in grouped {
        md.push_str(&format!("## {} ({})\n\n", status, records.len()));
        md.push_str("| Link | Referer | Text | Image | Redirect |\n");
        md.push_str("|------|---------|------|-------|----------|\n");
        for record in records {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                escape_cell(&record.link_url),
                escape_cell(&record.referer),
                escape_cell(&record.link_text),
                escape_cell(&record.link_img),
                escape_cell(record.redirect_url.as_deref().unwrap_or("")),
            ));
        }
        md.push('\n');
    }

    md
}
