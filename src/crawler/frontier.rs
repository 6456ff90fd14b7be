//! Deduplicating URL frontier
//!
//! A FIFO of canonical URLs that can grow while it is being drained. The
//! seen set, the pending queue and both counters live behind one mutex so
//! that `processed <= total` holds at every observation point.

use crate::url::{canonicalize, CanonicalUrl, HostFilter};
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Snapshot of frontier counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontierStats {
    /// Distinct canonical URLs ever accepted
    pub total: u64,
    /// Completions reported by the worker pool
    pub processed: u64,
    /// URLs waiting to be dequeued
    pub pending: usize,
}

#[derive(Debug, Default)]
struct FrontierInner {
    seen: HashSet<String>,
    pending: VecDeque<CanonicalUrl>,
    total: u64,
    processed: u64,
}

/// Thread-safe deduplicating queue shared by the pool and its tasks
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
    exclusions: HostFilter,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier that never admits hosts matching `exclusions`
    pub fn with_exclusions(exclusions: HostFilter) -> Self {
        Self {
            inner: Mutex::default(),
            exclusions,
        }
    }

    // A panicking holder cannot leave the inner state half-updated
    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Canonicalizes and enqueues a raw URL
    ///
    /// Returns `true` only if the URL was not seen before. Malformed URLs
    /// and excluded hosts are logged and rejected without mutating state.
    pub fn enqueue(&self, raw: &str) -> bool {
        match canonicalize(raw) {
            Ok(url) => self.enqueue_canonical(url),
            Err(e) => {
                tracing::debug!("Rejected URL '{}': {}", raw, e);
                false
            }
        }
    }

    /// Enqueues an already canonical URL
    pub fn enqueue_canonical(&self, url: CanonicalUrl) -> bool {
        if self.exclusions.excludes(&url) {
            tracing::debug!("Excluded host: {}", url);
            return false;
        }

        let mut inner = self.lock();
        if !inner.seen.insert(url.as_str().to_string()) {
            tracing::trace!("Already seen: {}", url);
            return false;
        }
        inner.pending.push_back(url);
        inner.total += 1;
        true
    }

    /// Enqueues every URL in order, returning how many were accepted
    pub fn seed<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        urls.into_iter()
            .filter(|url| self.enqueue(url.as_ref()))
            .count()
    }

    /// Pops the oldest pending URL; never blocks
    pub fn dequeue(&self) -> Option<CanonicalUrl> {
        self.lock().pending.pop_front()
    }

    /// Records one completed task, returning the new processed count
    pub fn mark_processed(&self) -> u64 {
        let mut inner = self.lock();
        inner.processed += 1;
        debug_assert!(inner.processed <= inner.total);
        inner.processed
    }

    pub fn has_pending(&self) -> bool {
        !self.lock().pending.is_empty()
    }

    pub fn stats(&self) -> FrontierStats {
        let inner = self.lock();
        FrontierStats {
            total: inner.total,
            processed: inner.processed,
            pending: inner.pending.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_enqueue_dedupes_canonical_forms() {
        let frontier = Frontier::new();
        assert!(frontier.enqueue("https://x.com/page?sid=abc"));
        assert!(!frontier.enqueue("https://X.com/page"));
        assert!(!frontier.enqueue("https://x.com/page#top"));

        let stats = frontier.stats();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.pending, 1);
    }

    #[test]
    fn test_malformed_url_is_noop() {
        let frontier = Frontier::new();
        assert!(!frontier.enqueue("not a url"));
        assert!(!frontier.enqueue("mailto:guide@example.com"));
        assert_eq!(frontier.stats(), FrontierStats::default());
    }

    #[test]
    fn test_fifo_order() {
        let frontier = Frontier::new();
        assert_eq!(
            frontier.seed(["https://a.com/", "https://b.com/", "https://a.com/"]),
            2
        );

        assert_eq!(frontier.dequeue().unwrap().as_str(), "https://a.com/");
        assert_eq!(frontier.dequeue().unwrap().as_str(), "https://b.com/");
        assert!(frontier.dequeue().is_none());
        assert!(!frontier.has_pending());
    }

    #[test]
    fn test_dequeued_url_is_not_readmitted() {
        let frontier = Frontier::new();
        frontier.enqueue("https://a.com/");
        frontier.dequeue();
        assert!(!frontier.enqueue("https://a.com/"));
        assert_eq!(frontier.stats().total, 1);
    }

    #[test]
    fn test_excluded_hosts_rejected() {
        let frontier = Frontier::with_exclusions(HostFilter::new(["*.toorgle.com"]));
        assert!(!frontier.enqueue("https://toorgle.com/search?q=x"));
        assert!(!frontier.enqueue("https://www.toorgle.com/"));
        assert!(frontier.enqueue("https://example.com/"));
        assert_eq!(frontier.stats().total, 1);
    }

    #[test]
    fn test_processed_monotonic_and_bounded() {
        let frontier = Frontier::new();
        frontier.seed(["https://a.com/", "https://b.com/"]);

        frontier.dequeue();
        assert_eq!(frontier.mark_processed(), 1);
        frontier.dequeue();
        assert_eq!(frontier.mark_processed(), 2);

        let stats = frontier.stats();
        assert_eq!(stats.processed, stats.total);
    }

    #[test]
    fn test_concurrent_enqueue_accepts_each_url_once() {
        let frontier = Arc::new(Frontier::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let frontier = Arc::clone(&frontier);
                std::thread::spawn(move || {
                    (0..100)
                        .filter(|i| frontier.enqueue(&format!("https://example.com/p{}", i)))
                        .count()
                })
            })
            .collect();

        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(accepted, 100);
        assert_eq!(frontier.stats().total, 100);
    }
}
