use crate::url::CanonicalUrl;

/// Checks if a domain matches a wildcard pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches:
///    - "example.com" (the bare domain)
///    - "blog.example.com" (single subdomain)
///    - "api.v2.example.com" (nested subdomains)
///
/// # Examples
///
/// ```
/// use contact_sweep::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(!matches_wildcard("example.com", "other.com"));
/// assert!(matches_wildcard("*.example.com", "api.v2.example.com"));
/// assert!(!matches_wildcard("*.example.com", "example.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base
            || candidate
                .strip_suffix(base)
                .is_some_and(|prefix| prefix.ends_with('.'))
    } else {
        candidate == pattern
    }
}

/// A set of host patterns whose URLs are never admitted to the frontier
///
/// Patterns are lowercased on construction; candidate hosts come from
/// [`CanonicalUrl::host`], which is already lowercase.
#[derive(Debug, Clone, Default)]
pub struct HostFilter {
    patterns: Vec<String>,
}

impl HostFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Returns true if the URL's host matches any exclusion pattern
    pub fn excludes(&self, url: &CanonicalUrl) -> bool {
        let host = url.host();
        self.patterns.iter().any(|p| matches_wildcard(p, host))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
