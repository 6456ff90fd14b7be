use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Contact-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub cleaning: CleaningConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub seeds: SeedConfig,
}

/// Worker pool and extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of in-flight tasks (defaults to 2.5x available parallelism)
    #[serde(default)]
    pub workers: Option<usize>,

    /// Wall-clock budget for one fetch + extract task (seconds)
    #[serde(rename = "task-timeout", default = "default_task_timeout")]
    pub task_timeout: u64,

    /// Log progress at info level every N completed tasks
    #[serde(rename = "progress-interval", default = "default_progress_interval")]
    pub progress_interval: u64,

    /// Blocks whose flattened text exceeds this many characters are skipped
    #[serde(rename = "max-block-chars", default = "default_max_block_chars")]
    pub max_block_chars: usize,
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Retries for transient failures (timeouts, connection errors, 5xx)
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retries (milliseconds)
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: u64,

    /// Whether robots.txt is consulted before fetching
    #[serde(rename = "respect-robots", default = "default_true")]
    pub respect_robots: bool,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Contact cleaning configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CleaningConfig {
    /// Default region used to parse and format phone numbers
    #[serde(default = "default_region")]
    pub region: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving dated result folders
    #[serde(rename = "results-dir")]
    pub results_dir: String,

    /// Label used in result file names (usually the first search query)
    pub label: String,
}

/// Seed supply configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    /// Inline seed URLs
    #[serde(default)]
    pub urls: Vec<String>,

    /// Text files with one seed URL per line
    #[serde(default)]
    pub files: Vec<String>,

    /// Host patterns never admitted to the frontier (e.g. "*.example.com")
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl CrawlerConfig {
    /// Returns the configured worker count or the default derived from available parallelism
    pub fn worker_capacity(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout)
    }
}

impl FetcherConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay)
    }
}

impl UserAgentConfig {
    /// Formats the full User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: None,
            task_timeout: default_task_timeout(),
            progress_interval: default_progress_interval(),
            max_block_chars: default_max_block_chars(),
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
            respect_robots: true,
        }
    }
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
        }
    }
}

/// 2.5 workers per available core, at least one
pub fn default_workers() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cores * 5 / 2).max(1)
}

fn default_task_timeout() -> u64 {
    60
}

fn default_progress_interval() -> u64 {
    50
}

fn default_max_block_chars() -> usize {
    20_000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_region() -> String {
    "US".to_string()
}
