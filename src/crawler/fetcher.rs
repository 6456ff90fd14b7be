//! Page fetching
//!
//! The worker pool only sees the `Fetcher` trait. `HttpFetcher` is the
//! production implementation: it consults robots.txt, retries transient
//! failures and returns an empty body for non-HTML content.

use crate::config::{FetcherConfig, UserAgentConfig};
use crate::robots::RobotsCache;
use crate::url::CanonicalUrl;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Maximum redirect hops followed by the HTTP client
const MAX_REDIRECTS: usize = 10;

/// Classified fetch failure for one URL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Timeouts, connection failures and server errors may succeed on retry
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Turns a canonical URL into HTML
///
/// `budget` bounds the whole fetch, retries included. Implementations return
/// `Ok("")` for responses that are not HTML.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        url: &CanonicalUrl,
        budget: Duration,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use contact_sweep::config::{FetcherConfig, UserAgentConfig};
/// use contact_sweep::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "ContactSweep".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/bot".to_string(),
///     contact_email: "bot@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, &FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetcher: &FetcherConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(fetcher.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed fetcher with robots.txt policy and retries
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    robots: Option<RobotsCache>,
    request_timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    pub fn new(user_agent: &UserAgentConfig, config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, config)?;
        let robots = config
            .respect_robots
            .then(|| RobotsCache::new(user_agent.crawler_name.clone()));

        Ok(Self {
            client,
            robots,
            request_timeout: config.request_timeout(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        })
    }

    /// Consults the per-origin robots.txt policy
    pub async fn allowed(&self, url: &CanonicalUrl) -> bool {
        match &self.robots {
            Some(robots) => robots.allowed(&self.client, url).await,
            None => true,
        }
    }

    async fn fetch_once(&self, url: &CanonicalUrl, timeout: Duration) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(e, timeout))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::AccessDenied(format!("HTTP {} for {}", status.as_u16(), url)));
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !is_html(&content_type) {
            tracing::debug!("Skipping non-HTML content ({}) at {}", content_type, url);
            return Ok(String::new());
        }

        response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(e, timeout))
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &CanonicalUrl, budget: Duration) -> Result<String, FetchError> {
        let deadline = Instant::now() + budget;

        if !self.allowed(url).await {
            return Err(FetchError::AccessDenied(format!("robots.txt disallows {}", url)));
        }

        let mut attempt = 0;
        loop {
            let Some(timeout) = attempt_timeout(deadline, self.request_timeout) else {
                return Err(FetchError::Timeout(budget));
            };

            match self.fetch_once(url, timeout).await {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::debug!(
                        "Retrying {} ({}/{}) after error: {}",
                        url,
                        attempt,
                        self.max_retries,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                result => return result,
            }
        }
    }
}

/// Per-attempt timeout: the request timeout, capped by what is left of the budget
fn attempt_timeout(deadline: Instant, request_timeout: Duration) -> Option<Duration> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    (!remaining.is_zero()).then(|| remaining.min(request_timeout))
}

/// Missing Content-Type is treated as HTML
fn is_html(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml")
}

fn classify_reqwest_error(e: reqwest::Error, timeout: Duration) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(timeout)
    } else if e.is_connect() {
        FetchError::Network(format!("Connection failed: {}", e))
    } else if e.is_builder() {
        FetchError::InvalidUrl(e.to_string())
    } else if e.is_redirect() {
        FetchError::Other(format!("Redirect error: {}", e))
    } else if e.is_body() || e.is_decode() || e.is_request() {
        FetchError::Network(e.to_string())
    } else {
        FetchError::Other(e.to_string())
    }
}
