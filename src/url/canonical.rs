use crate::NormalizationError;
use std::fmt;
use url::Url;

/// Query parameters stripped during canonicalization (compared lowercase)
const TRACKING_PARAMS: &[&str] = &[
    "fbclid",
    "gclid",
    "mc_eid",
    "ref",
    "source",
    "sid",
    "sessionid",
    "session_id",
    "phpsessid",
    "jsessionid",
    "aspsessionid",
    "cfid",
    "cftoken",
];

/// A URL rewritten into one normalized, directly comparable form
///
/// Two raw URLs that canonicalize to the same `CanonicalUrl` are the same
/// frontier entry. Values are only produced by [`canonicalize`] and
/// [`canonicalize_relative`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    /// Returns the canonical string form
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the underlying parsed URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the (lowercase) host of this URL
    pub fn host(&self) -> &str {
        // canonicalize() rejects URLs without a host
        self.0.host_str().unwrap_or_default()
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Canonicalizes an absolute URL
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an `http` or `https` scheme and a host
/// 3. Lowercase scheme and host (the `url` parser does this for http(s))
/// 4. Normalize path:
///    - Remove dot segments (. and ..)
///    - Collapse repeated slashes
///    - Keep a trailing slash (`/guides/` and `/guides` stay distinct)
/// 5. Remove fragment (everything after #)
/// 6. Remove tracking and session query parameters
/// 7. Sort remaining query parameters by key
/// 8. Remove empty query string (trailing ?)
///
/// The result is idempotent: canonicalizing a canonical URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use contact_sweep::url::canonicalize;
///
/// let url = canonicalize("https://X.com/page?sid=abc").unwrap();
/// assert_eq!(url.as_str(), "https://x.com/page");
/// ```
pub fn canonicalize(raw: &str) -> Result<CanonicalUrl, NormalizationError> {
    let url = Url::parse(raw.trim()).map_err(|e| NormalizationError::Parse(e.to_string()))?;
    canonicalize_url(url)
}

/// Resolves a possibly relative reference against `base`, then canonicalizes it
///
/// # Examples
///
/// ```
/// use contact_sweep::url::canonicalize_relative;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/about/team").unwrap();
/// let url = canonicalize_relative("/contact-us", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/contact-us");
/// ```
pub fn canonicalize_relative(raw: &str, base: &Url) -> Result<CanonicalUrl, NormalizationError> {
    let url = base
        .join(raw.trim())
        .map_err(|e| NormalizationError::Parse(e.to_string()))?;
    canonicalize_url(url)
}

fn canonicalize_url(mut url: Url) -> Result<CanonicalUrl, NormalizationError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(NormalizationError::UnsupportedScheme(url.scheme().to_string()));
    }

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_lowercase(),
        _ => return Err(NormalizationError::MissingHost),
    };
    if url.host_str() != Some(host.as_str()) {
        url.set_host(Some(&host))
            .map_err(|e| NormalizationError::Malformed(format!("Failed to set host: {}", e)))?;
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(CanonicalUrl(url))
}

/// Normalizes a URL path by removing dot segments and empty segments
fn normalize_path(path: &str) -> String {
    let directory = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    if directory {
        format!("/{}/", segments.join("/"))
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Filters out tracking parameters and sorts remaining query parameters by key
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    // Stable sort keeps repeated keys in their original order
    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}
