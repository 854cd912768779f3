//! JSON file sink
//!
//! Writes the run's records as one JSON array, four-space indented and
//! without ASCII escaping.

use crate::output::record::LinkRecord;
use crate::output::stats::RunStats;
use crate::output::traits::{OutputHandler, OutputResult};
use crate::storage::RunStatus;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Buffers records and writes them as a JSON array on finalize
pub struct JsonOutputHandler {
    path: PathBuf,
    records: Vec<LinkRecord>,
}

impl JsonOutputHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputHandler for JsonOutputHandler {
    fn name(&self) -> &'static str {
        "json"
    }

    fn record(&mut self, record: &LinkRecord) -> OutputResult<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finalize(&mut self, status: RunStatus, _stats: &RunStats) -> OutputResult<()> {
        write_records(&self.path, &self.records)?;
        info!(
            "Wrote {} records to {} (run {})",
            self.records.len(),
            self.path.display(),
            status
        );
        Ok(())
    }
}

/// Writes records to `path` as a pretty-printed JSON array
pub fn write_records(path: &Path, records: &[LinkRecord]) -> OutputResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    records.serialize(&mut serializer)?;

    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Reads a JSON array of records from `path`
pub fn read_records(path: &Path) -> OutputResult<Vec<LinkRecord>> {
    let file = File::open(path)?;
    let records = serde_json::from_reader(BufReader::new(file))?;
    Ok(records)
}
