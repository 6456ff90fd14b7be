//! In-flight task bookkeeping and outcome classification
//!
//! Every task the worker pool runs ends in exactly one `TaskOutcome`.

use crate::url::CanonicalUrl;
use std::fmt;
use std::time::{Duration, Instant};

/// A unit of work (fetch + extract for one URL) owned by one worker slot
#[derive(Debug, Clone)]
pub struct Task {
    pub url: CanonicalUrl,
    pub started_at: Instant,
}

impl Task {
    pub fn start(url: CanonicalUrl) -> Self {
        Self {
            url,
            started_at: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Classified result of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskOutcome {
    // ===== Success =====
    /// Page fetched and extracted (possibly zero records)
    Extracted,

    /// Fetcher returned no HTML (non-HTML content or empty body)
    Empty,

    // ===== Skips =====
    /// URL rejected before any fetch attempt
    InvalidUrl,

    /// Blocked by the site's crawl policy
    AccessDenied,

    // ===== Failures =====
    /// Fetch or the task's wall-clock budget timed out
    TimedOut,

    /// Any other error, including a panicking task
    Failed,
}

impl TaskOutcome {
    /// Returns true if the page was fetched without error
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted | Self::Empty)
    }

    /// Returns true if the page was never attempted
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::InvalidUrl | Self::AccessDenied)
    }

    /// Returns true if this outcome is logged at warning level
    pub fn is_error(&self) -> bool {
        matches!(self, Self::TimedOut | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extracted => "extracted",
            Self::Empty => "empty",
            Self::InvalidUrl => "invalid_url",
            Self::AccessDenied => "access_denied",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
        }
    }

    pub fn all() -> [Self; 6] {
        [
            Self::Extracted,
            Self::Empty,
            Self::InvalidUrl,
            Self::AccessDenied,
            Self::TimedOut,
            Self::Failed,
        ]
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
