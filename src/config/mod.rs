//! Configuration module for Contact-Sweep
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and collecting seed URLs from the configuration and seed files.
//!
//! # Example
//!
//! ```no_run
//! use contact_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sweep.toml")).unwrap();
//! println!("Worker capacity: {}", config.crawler.worker_capacity());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_workers, CleaningConfig, Config, CrawlerConfig, FetcherConfig, OutputConfig,
    SeedConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{
    collect_seeds, compute_config_hash, load_config, load_config_with_hash, read_seed_file,
};
