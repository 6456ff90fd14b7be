//! End-of-run statistics
//!
//! Summarizes a finished run and prints it to stdout.

use crate::crawler::RunReport;
use crate::state::TaskOutcome;
use std::collections::HashMap;
use std::time::Duration;

/// Run statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Count of completed tasks by outcome
    pub outcomes: HashMap<TaskOutcome, u64>,

    /// Distinct URLs accepted by the frontier
    pub total_urls: u64,

    /// Tasks completed
    pub processed_urls: u64,

    /// Records extracted before cleaning
    pub raw_records: usize,

    /// Rows left after cleaning
    pub cleaned_rows: usize,

    pub elapsed: Duration,
}

impl RunSummary {
    pub fn from_report(report: &RunReport) -> Self {
        Self {
            outcomes: report.pool.outcomes.clone(),
            total_urls: report.pool.frontier.total,
            processed_urls: report.pool.frontier.processed,
            raw_records: report.raw_records,
            cleaned_rows: report.table.len(),
            elapsed: report.pool.elapsed,
        }
    }

    pub fn count(&self, outcome: TaskOutcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    fn count_where(&self, pred: fn(&TaskOutcome) -> bool) -> u64 {
        TaskOutcome::all()
            .into_iter()
            .filter(pred)
            .map(|o| self.count(o))
            .sum()
    }

    /// Pages fetched without error
    pub fn succeeded(&self) -> u64 {
        self.count_where(TaskOutcome::is_success)
    }

    /// URLs never attempted (invalid or denied)
    pub fn skipped(&self) -> u64 {
        self.count_where(TaskOutcome::is_skipped)
    }

    /// Timeouts and fetch failures
    pub fn errors(&self) -> u64 {
        self.count_where(TaskOutcome::is_error)
    }

    /// Percentage of processed URLs that were fetched without error
    pub fn success_rate(&self) -> f64 {
        if self.processed_urls == 0 {
            return 0.0;
        }
        (self.succeeded() as f64 / self.processed_urls as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Contact Sweep Summary ===");
    println!();
    println!(
        "URLs: {} processed / {} discovered",
        summary.processed_urls, summary.total_urls
    );
    println!(
        "Contacts: {} raw, {} after cleaning",
        summary.raw_records, summary.cleaned_rows
    );
    println!("Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    let mut outcome_counts: Vec<_> = summary
        .outcomes
        .iter()
        .filter(|(_, count)| **count > 0)
        .collect();
    if !outcome_counts.is_empty() {
        println!("Outcomes:");
        outcome_counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

        for (outcome, count) in outcome_counts {
            println!("  {}: {}", outcome, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched without error)",
        summary.success_rate(),
        summary.succeeded(),
        summary.processed_urls
    );
    println!("Skipped: {}, Errors: {}", summary.skipped(), summary.errors());
}
