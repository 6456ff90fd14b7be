//! Result persistence and run reporting
//!
//! This module handles:
//! - Writing the cleaned contact table through a `ResultSink`
//! - Laying out dated result paths
//! - Printing the end-of-run summary

mod csv_sink;
pub mod stats;

pub use csv_sink::CsvSink;
pub use stats::{print_summary, RunSummary};

use crate::cleaning::CleanedTable;
use crate::config::OutputConfig;
use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while persisting results
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// What a sink did with a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    Written { path: PathBuf, rows: usize },
    /// The table was empty; nothing was written
    NoData,
}

/// Destination for the cleaned contact table
pub trait ResultSink {
    fn write(&self, table: &CleanedTable, path: &Path) -> Result<SinkOutcome, SinkError>;
}

/// Builds `<results-dir>/<YYYY_MM_DD>/<YYYY-MM-DD_HH-MM-SS>_<label>.csv`
///
/// Spaces in the label become hyphens.
pub fn result_path<Tz>(config: &OutputConfig, now: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let label: String = config
        .label
        .trim()
        .chars()
        .map(|c| match c {
            ' ' => '-',
            '/' | '\\' => '_',
            c => c,
        })
        .collect();

    Path::new(&config.results_dir)
        .join(now.format("%Y_%m_%d").to_string())
        .join(format!("{}_{}.csv", now.format("%Y-%m-%d_%H-%M-%S"), label))
}
