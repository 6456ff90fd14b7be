//! Robots.txt handling module
//!
//! Fetching, parsing and per-origin caching of robots.txt policies.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::ParsedRobots;

use reqwest::{Client, StatusCode};

/// Fetches and parses robots.txt for an origin
///
/// Never fails: 401/403 yield a disallow-all policy, any other error status
/// or network failure yields allow-all.
///
/// # Arguments
///
/// * `client` - The HTTP client (carries the crawler's User-Agent)
/// * `origin` - `scheme://host[:port]` without a trailing slash
pub async fn fetch_robots(client: &Client, origin: &str) -> ParsedRobots {
    let robots_url = format!("{}/robots.txt", origin);

    let response = match client.get(&robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("robots.txt unreachable at {}: {}", robots_url, e);
            return ParsedRobots::allow_all();
        }
    };

    match response.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            tracing::debug!("robots.txt restricted at {}; disallowing all", robots_url);
            ParsedRobots::disallow_all()
        }
        status if status.is_success() => match response.text().await {
            Ok(body) => ParsedRobots::from_content(&body),
            Err(e) => {
                tracing::debug!("Failed to read robots.txt at {}: {}", robots_url, e);
                ParsedRobots::allow_all()
            }
        },
        status => {
            tracing::trace!("robots.txt at {} returned {}", robots_url, status);
            ParsedRobots::allow_all()
        }
    }
}
