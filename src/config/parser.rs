use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a hex-encoded SHA-256 hash of the configuration file content
///
/// Logged at start-up so result files can be traced back to the
/// configuration that produced them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Reads seed URLs from a text file
///
/// One URL per line; blank lines and lines starting with `#` are ignored.
/// URLs are returned raw: canonicalization happens when they enter the frontier.
pub fn read_seed_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Collects every seed URL in order: inline config URLs, config seed files,
/// then any extra seed files given on the command line
pub fn collect_seeds(config: &Config, extra_files: &[PathBuf]) -> Result<Vec<String>, ConfigError> {
    let mut seeds = config.seeds.urls.clone();

    let files = config
        .seeds
        .files
        .iter()
        .map(PathBuf::from)
        .chain(extra_files.iter().cloned());

    for file in files {
        let from_file = read_seed_file(&file)?;
        tracing::debug!("Loaded {} seed URLs from {}", from_file.len(), file.display());
        seeds.extend(from_file);
    }

    Ok(seeds)
}
