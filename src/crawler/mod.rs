//! Crawler module: the concurrent extraction pipeline
//!
//! This module contains:
//! - The deduplicating frontier
//! - Page fetching with robots.txt policy and retries
//! - Proximity-based contact extraction
//! - The bounded worker pool
//! - Overall run coordination

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod pool;

pub use coordinator::{run_sweep, Coordinator, RunReport, SweepOutcome};
pub use extractor::{extract_block, extract_contacts, ExtractionConfig, ExtractionError};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher};
pub use frontier::{Frontier, FrontierStats};
pub use pool::{PoolReport, WorkerPool};
