//! Bounded worker pool draining the frontier
//!
//! One coordinating loop owns a `JoinSet` of page tasks. It keeps up to
//! `capacity` tasks in flight, folds each completion into the accumulator
//! and stops once nothing is in flight and nothing is pending. A failing,
//! timed-out or panicking task is classified and counted; it never aborts
//! the pool.

use crate::config::CrawlerConfig;
use crate::crawler::extractor::{extract_contacts, ExtractionConfig};
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::frontier::{Frontier, FrontierStats};
use crate::state::{ContactRecord, Task, TaskOutcome};
use crate::url::CanonicalUrl;
use crate::SweepError;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Why a page task produced no records
#[derive(Debug)]
enum TaskError {
    Fetch(FetchError),
    TimedOut(Duration),
    Panicked(String),
}

/// `Ok(None)` when the fetcher returned no HTML
type TaskResult = Result<Option<Vec<ContactRecord>>, TaskError>;

/// Everything the pool accumulated over one run
#[derive(Debug, Default)]
pub struct PoolReport {
    pub records: Vec<ContactRecord>,
    pub outcomes: HashMap<TaskOutcome, u64>,
    pub frontier: FrontierStats,
    pub elapsed: Duration,
}

impl PoolReport {
    pub fn count(&self, outcome: TaskOutcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Pages fetched without error
    pub fn succeeded(&self) -> u64 {
        TaskOutcome::all()
            .into_iter()
            .filter(TaskOutcome::is_success)
            .map(|o| self.count(o))
            .sum()
    }
}

/// Fixed-capacity task runner
#[derive(Debug, Clone)]
pub struct WorkerPool {
    capacity: usize,
    task_timeout: Duration,
    progress_interval: u64,
}

impl WorkerPool {
    /// # Errors
    ///
    /// `SweepError::PoolStart` if `capacity` is zero
    pub fn new(
        capacity: usize,
        task_timeout: Duration,
        progress_interval: u64,
    ) -> Result<Self, SweepError> {
        if capacity == 0 {
            return Err(SweepError::PoolStart(
                "capacity must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            task_timeout,
            progress_interval: progress_interval.max(1),
        })
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self, SweepError> {
        Self::new(
            config.worker_capacity(),
            config.task_timeout(),
            config.progress_interval,
        )
    }

    /// Drains `frontier` until it has no pending URLs and no task is in flight
    ///
    /// Tasks may enqueue more URLs while the pool runs; they are picked up by
    /// the next fill step.
    pub async fn run<F: Fetcher>(
        &self,
        frontier: Arc<Frontier>,
        fetcher: Arc<F>,
        extraction: ExtractionConfig,
    ) -> PoolReport {
        let started = Instant::now();
        let mut report = PoolReport::default();
        let mut tasks: JoinSet<(Task, TaskResult)> = JoinSet::new();
        let mut in_flight: HashMap<CanonicalUrl, Instant> = HashMap::new();

        tracing::info!(
            "Worker pool starting: capacity {}, {} URLs pending",
            self.capacity,
            frontier.stats().pending
        );

        loop {
            while tasks.len() < self.capacity {
                let Some(url) = frontier.dequeue() else {
                    break;
                };
                let task = Task::start(url);
                in_flight.insert(task.url.clone(), task.started_at);
                tasks.spawn(run_task(
                    task,
                    Arc::clone(&frontier),
                    Arc::clone(&fetcher),
                    extraction,
                    self.task_timeout,
                ));
            }

            // Nothing running means nothing can enqueue more work
            let Some(joined) = tasks.join_next().await else {
                break;
            };

            match joined {
                Ok((task, result)) => {
                    in_flight.remove(&task.url);
                    let outcome = fold_result(&task, result, &mut report.records);
                    *report.outcomes.entry(outcome).or_insert(0) += 1;
                }
                Err(e) => {
                    tracing::warn!("Page task aborted: {}", e);
                    *report.outcomes.entry(TaskOutcome::Failed).or_insert(0) += 1;
                }
            }

            let processed = frontier.mark_processed();
            let total = frontier.stats().total;
            if processed % self.progress_interval == 0 {
                tracing::info!("Processed {}/{} URLs", processed, total);
            } else {
                tracing::debug!(
                    "Processed {}/{} URLs ({} in flight)",
                    processed,
                    total,
                    in_flight.len()
                );
            }
        }

        report.frontier = frontier.stats();
        report.elapsed = started.elapsed();

        tracing::info!(
            "Worker pool finished: {} URLs processed, {} raw records in {:.1}s",
            report.frontier.processed,
            report.records.len(),
            report.elapsed.as_secs_f64()
        );

        report
    }
}

/// Fetch + extract for one URL under the wall-clock budget
///
/// Always returns its task, even when the work panics, so the loop can
/// attribute the completion.
async fn run_task<F: Fetcher>(
    task: Task,
    frontier: Arc<Frontier>,
    fetcher: Arc<F>,
    extraction: ExtractionConfig,
    timeout: Duration,
) -> (Task, TaskResult) {
    let work = process_page(&task.url, &frontier, fetcher.as_ref(), &extraction, timeout);

    let result = match AssertUnwindSafe(tokio::time::timeout(timeout, work))
        .catch_unwind()
        .await
    {
        Ok(Ok(result)) => result.map_err(TaskError::Fetch),
        Ok(Err(_)) => Err(TaskError::TimedOut(timeout)),
        Err(panic) => Err(TaskError::Panicked(panic_message(panic.as_ref()))),
    };

    (task, result)
}

async fn process_page<F: Fetcher>(
    url: &CanonicalUrl,
    frontier: &Frontier,
    fetcher: &F,
    extraction: &ExtractionConfig,
    timeout: Duration,
) -> Result<Option<Vec<ContactRecord>>, FetchError> {
    let html = fetcher.fetch(url, timeout).await?;
    if html.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(extract_contacts(&html, url, frontier, extraction)))
}

/// Classifies a completion, logs it and moves its records into `records`
fn fold_result(task: &Task, result: TaskResult, records: &mut Vec<ContactRecord>) -> TaskOutcome {
    let url = &task.url;
    match result {
        Ok(Some(found)) => {
            if found.is_empty() {
                tracing::debug!("No contacts found for: {}", url);
            } else {
                tracing::debug!("Added {} contacts from: {}", found.len(), url);
            }
            records.extend(found);
            TaskOutcome::Extracted
        }
        Ok(None) => {
            tracing::debug!("No HTML at {}", url);
            TaskOutcome::Empty
        }
        Err(TaskError::Fetch(FetchError::InvalidUrl(e))) => {
            tracing::debug!("Invalid URL {}: {}", url, e);
            TaskOutcome::InvalidUrl
        }
        Err(TaskError::Fetch(FetchError::AccessDenied(e))) => {
            tracing::debug!("Access denied for {}: {}", url, e);
            TaskOutcome::AccessDenied
        }
        Err(TaskError::Fetch(e @ FetchError::Timeout(_))) => {
            tracing::warn!("Fetch timed out for {}: {}", url, e);
            TaskOutcome::TimedOut
        }
        Err(TaskError::TimedOut(budget)) => {
            tracing::warn!(
                "Task for {} exceeded its {:?} budget after {:?}",
                url,
                budget,
                task.elapsed()
            );
            TaskOutcome::TimedOut
        }
        Err(TaskError::Fetch(e)) => {
            tracing::warn!("Failed to process {}: {}", url, e);
            TaskOutcome::Failed
        }
        Err(TaskError::Panicked(message)) => {
            tracing::warn!("Task for {} panicked: {}", url, message);
            TaskOutcome::Failed
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
