//! Contact-link filter
//!
//! Post-processing pass over a finished record set that drops records whose
//! anchor text looks like an e-mail address.

use crate::output::json::{read_records, write_records};
use crate::output::record::LinkRecord;
use crate::output::traits::OutputResult;
use std::path::Path;
use tracing::info;

/// Returns true if the record's link text contains `@`
pub fn is_contact_record(record: &LinkRecord) -> bool {
    record.link_text.contains('@')
}

/// Drops contact records, preserving the order of the rest
pub fn filter_contact_records(records: Vec<LinkRecord>) -> Vec<LinkRecord> {
    records
        .into_iter()
        .filter(|record| !is_contact_record(record))
        .collect()
}

/// Filters the JSON array at `input` and writes the result to `output`
///
/// # Returns
///
/// `(kept, removed)` record counts
pub fn clean_file(input: &Path, output: &Path) -> OutputResult<(usize, usize)> {
    let records = read_records(input)?;
    let total = records.len();

    let kept = filter_contact_records(records);
    write_records(output, &kept)?;

    let removed = total - kept.len();
    info!(
        "Filtered {} contact records; {} kept in {}",
        removed,
        kept.len(),
        output.display()
    );

    Ok((kept.len(), removed))
}
