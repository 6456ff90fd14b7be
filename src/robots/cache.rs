//! Per-origin robots.txt cache
//!
//! Entries expire after 24 hours and are refetched on next use.

use crate::robots::{fetch_robots, ParsedRobots};
use crate::url::CanonicalUrl;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Cached robots.txt data for an origin
#[derive(Debug, Clone)]
pub struct CachedRobots {
    pub content: ParsedRobots,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    pub fn new(content: ParsedRobots) -> Self {
        Self {
            content,
            fetched_at: Utc::now(),
        }
    }

    /// True once the entry is older than 24 hours
    pub fn is_stale(&self) -> bool {
        self.age() > Duration::hours(24)
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }
}

/// Shared map from origin (`scheme://host[:port]`) to its crawl policy
///
/// The lock is only held for lookups and inserts, never across a fetch.
/// Two tasks racing on a cold origin may both fetch robots.txt; the later
/// insert wins.
#[derive(Debug)]
pub struct RobotsCache {
    user_agent: String,
    entries: Mutex<HashMap<String, CachedRobots>>,
}

impl RobotsCache {
    /// # Arguments
    ///
    /// * `user_agent` - The product token matched against `User-agent` lines
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Checks whether `url` may be fetched, fetching robots.txt on a miss
    pub async fn allowed(&self, client: &Client, url: &CanonicalUrl) -> bool {
        let origin = url.as_url().origin().ascii_serialization();

        if let Some(cached) = self.lookup(&origin) {
            return cached.content.is_allowed(url.as_str(), &self.user_agent);
        }

        let robots = fetch_robots(client, &origin).await;
        let allowed = robots.is_allowed(url.as_str(), &self.user_agent);
        self.insert(origin, robots);
        allowed
    }

    /// Returns a fresh cached entry, evicting a stale one
    pub fn lookup(&self, origin: &str) -> Option<CachedRobots> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(origin) {
            Some(cached) if cached.is_stale() => {
                tracing::debug!("robots.txt for {} is stale", origin);
                entries.remove(origin);
                None
            }
            other => other.cloned(),
        }
    }

    pub fn insert(&self, origin: String, robots: ParsedRobots) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(origin, CachedRobots::new(robots));
    }
}
