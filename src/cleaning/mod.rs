//! Post-run contact cleaning
//!
//! Runs exactly once, after the worker pool has drained the frontier:
//! phone and email fields are standardized (bad values are blanked, the
//! record is kept), then exact duplicate rows are removed.

mod email;
mod phone;

pub use email::standardize_email;
pub use phone::{standardize_phone, Region};

use crate::config::CleaningConfig;
use crate::state::{ContactField, ContactRecord, IdentityKey};
use std::collections::HashSet;
use thiserror::Error;

/// Columns always present in a cleaned table, even when empty
const REQUIRED_COLUMNS: [ContactField; 3] =
    [ContactField::Phone1, ContactField::Email1, ContactField::Source];

const PHONE_FIELDS: [ContactField; 2] = [ContactField::Phone1, ContactField::Phone2];
const EMAIL_FIELDS: [ContactField; 2] = [ContactField::Email1, ContactField::Email2];

/// Per-field cleaning failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CleaningError {
    #[error("No contact information to clean")]
    Empty,

    #[error("Invalid phone number '{value}': {reason}")]
    InvalidPhone { value: String, reason: String },

    #[error("Phone number '{value}' is not a {region} number")]
    WrongRegion { value: String, region: Region },

    #[error("Invalid email address '{value}': {reason}")]
    InvalidEmail { value: String, reason: String },

    #[error("Unknown region '{0}' (expected US or CA)")]
    UnknownRegion(String),
}

/// Standardized, deduplicated contact records plus their column list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedTable {
    pub columns: Vec<ContactField>,
    pub rows: Vec<ContactRecord>,
}

impl CleanedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Header names in column order
    pub fn header(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Cell values of one row in column order, empty string for blank slots
    pub fn cells<'a>(&self, row: &'a ContactRecord) -> Vec<&'a str> {
        self.columns
            .iter()
            .map(|c| row.get(*c).unwrap_or(""))
            .collect()
    }
}

/// Standardizes phone and email fields, then drops exact duplicate rows
pub fn clean_contacts(records: Vec<ContactRecord>, config: &CleaningConfig) -> CleanedTable {
    if records.is_empty() {
        tracing::error!("{}", CleaningError::Empty);
        return CleanedTable::default();
    }

    let region = config.region.parse::<Region>().unwrap_or_else(|e| {
        tracing::warn!("{}; using {}", e, Region::default());
        Region::default()
    });

    let raw_count = records.len();
    let mut blanked = 0usize;
    let mut seen: HashSet<IdentityKey> = HashSet::new();
    let mut rows = Vec::new();

    for mut record in records {
        blanked += standardize_record(&mut record, region);
        if seen.insert(record.identity_key()) {
            rows.push(record);
        }
    }

    let columns = ContactField::ALL
        .iter()
        .copied()
        .filter(|field| {
            REQUIRED_COLUMNS.contains(field) || rows.iter().any(|r| r.get(*field).is_some())
        })
        .collect();

    tracing::info!(
        "Cleaned {} raw records into {} rows ({} fields blanked)",
        raw_count,
        rows.len(),
        blanked
    );

    CleanedTable { columns, rows }
}

/// Returns the number of fields blanked
fn standardize_record(record: &mut ContactRecord, region: Region) -> usize {
    let mut blanked = 0;

    for field in PHONE_FIELDS {
        if let Some(raw) = record.get(field).map(str::to_string) {
            let cleaned = standardize_phone(&raw, region)
                .map_err(|e| tracing::debug!("{} ({})", e, record.source))
                .ok();
            blanked += usize::from(cleaned.is_none());
            record.set(field, cleaned);
        }
    }

    for field in EMAIL_FIELDS {
        if let Some(raw) = record.get(field).map(str::to_string) {
            let cleaned = standardize_email(&raw)
                .map_err(|e| tracing::debug!("{} ({})", e, record.source))
                .ok();
            blanked += usize::from(cleaned.is_none());
            record.set(field, cleaned);
        }
    }

    blanked
}
