//! CSV result sink

use crate::cleaning::CleanedTable;
use crate::output::{ResultSink, SinkError, SinkOutcome};
use std::path::Path;

/// Writes the cleaned table as CSV with a header row
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSink;

impl CsvSink {
    pub fn new() -> Self {
        Self
    }
}

impl ResultSink for CsvSink {
    /// Creates missing parent directories; an empty table writes nothing
    fn write(&self, table: &CleanedTable, path: &Path) -> Result<SinkOutcome, SinkError> {
        if table.is_empty() {
            tracing::error!("No contacts to save in csv");
            return Ok(SinkOutcome::NoData);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::WriterBuilder::new().from_path(path)?;
        writer.write_record(table.header())?;
        for row in &table.rows {
            writer.write_record(table.cells(row))?;
        }
        writer.flush()?;

        tracing::info!(
            "Data saved to {}. Total unique contacts: {}",
            path.display(),
            table.len()
        );

        Ok(SinkOutcome::Written {
            path: path.to_path_buf(),
            rows: table.len(),
        })
    }
}
