//! Run coordination
//!
//! A `Coordinator` owns everything one run needs: the configuration, the
//! frontier, the fetcher and the worker pool. There is no global state; two
//! coordinators never share a frontier.

use crate::cleaning::{clean_contacts, CleanedTable};
use crate::config::Config;
use crate::crawler::extractor::ExtractionConfig;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::pool::{PoolReport, WorkerPool};
use crate::output::{result_path, CsvSink, ResultSink, SinkOutcome};
use crate::url::HostFilter;
use crate::SweepError;
use chrono::Local;
use std::path::Path;
use std::sync::Arc;

/// Result of one complete run (pool drained, contacts cleaned)
#[derive(Debug, Default)]
pub struct RunReport {
    /// Pool statistics; its `records` have been moved into the cleaner
    pub pool: PoolReport,
    /// Record count before cleaning
    pub raw_records: usize,
    pub table: CleanedTable,
}

/// Result of `run_sweep`
#[derive(Debug)]
pub struct SweepOutcome {
    /// Seeds accepted by the frontier
    pub seeded: usize,
    pub report: RunReport,
    pub sink: SinkOutcome,
}

/// Main run coordinator structure
pub struct Coordinator<F: Fetcher> {
    config: Config,
    frontier: Arc<Frontier>,
    fetcher: Arc<F>,
    pool: WorkerPool,
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a new coordinator with an empty frontier
    ///
    /// # Errors
    ///
    /// `SweepError::PoolStart` if the configured worker capacity is zero
    pub fn new(config: Config, fetcher: F) -> Result<Self, SweepError> {
        let pool = WorkerPool::from_config(&config.crawler)?;
        let exclusions = HostFilter::new(&config.seeds.exclude);
        if !exclusions.is_empty() {
            tracing::info!("Excluding {} host patterns", config.seeds.exclude.len());
        }
        let frontier = Frontier::with_exclusions(exclusions);

        Ok(Self {
            config,
            frontier: Arc::new(frontier),
            fetcher: Arc::new(fetcher),
            pool,
        })
    }

    /// Enqueues seed URLs in order, returning how many were accepted
    pub fn seed<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut offered = 0usize;
        let accepted = self.frontier.seed(urls.into_iter().inspect(|_| offered += 1));
        tracing::info!("Seeded frontier with {} of {} URLs", accepted, offered);
        accepted
    }

    /// Drains the frontier, then cleans the accumulated records once
    pub async fn run(&self) -> RunReport {
        let extraction = ExtractionConfig::from(&self.config.crawler);
        let mut pool = self
            .pool
            .run(Arc::clone(&self.frontier), Arc::clone(&self.fetcher), extraction)
            .await;

        let records = std::mem::take(&mut pool.records);
        let raw_records = records.len();
        let table = clean_contacts(records, &self.config.cleaning);

        RunReport {
            pool,
            raw_records,
            table,
        }
    }
}

/// Runs a complete sweep with the HTTP fetcher and CSV sink
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `seeds` - Raw seed URLs, in order
/// * `sink_path` - CSV destination; defaults to a dated path under `results-dir`
///
/// # Errors
///
/// Only fatal conditions: HTTP client construction, pool start, sink I/O.
/// Per-URL failures are counted in the report.
pub async fn run_sweep(
    config: Config,
    seeds: &[String],
    sink_path: Option<&Path>,
) -> Result<SweepOutcome, SweepError> {
    let path = sink_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| result_path(&config.output, &Local::now()));
    tracing::info!("CSV Filepath: {}", path.display());

    let fetcher = HttpFetcher::new(&config.user_agent, &config.fetcher)?;
    let coordinator = Coordinator::new(config, fetcher)?;

    let seeded = coordinator.seed(seeds);
    if seeded == 0 {
        tracing::warn!("No usable seed URLs; the run will be empty");
    }

    let report = coordinator.run().await;
    let sink = CsvSink::new().write(&report.table, &path)?;

    Ok(SweepOutcome {
        seeded,
        report,
        sink,
    })
}
