//! Proximity-based contact extraction
//!
//! A phone number or email address found inside a block-level element is
//! assumed to belong to the names and websites found in the same block.
//! Anchors that look like "contact us" links are fed back into the frontier.

use crate::config::CrawlerConfig;
use crate::crawler::Frontier;
use crate::state::{ContactField, ContactRecord, IdentityKey};
use crate::url::{canonicalize_relative, CanonicalUrl};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

/// Elements whose flattened text forms one proximity block
const BLOCK_TAGS: &str = "div, p, footer, section, td, span, article, header, aside, li";

/// Anchor labels (lowercased, whitespace-collapsed) that mark a contact page
const CONTACT_LABELS: [&str; 6] = [
    "contact",
    "contact us",
    "contact me",
    "reach out",
    "get in touch",
    "reach us",
];

// =============================================================================
// Regex Patterns
// =============================================================================

static RE_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(?\b[0-9]{3}\)?[-. ]?[0-9]{3}[-. ]?[0-9]{4}\b").unwrap()
});
static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9_.+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+").unwrap()
});
static RE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Mr\.|Mrs\.|Ms\.|Dr\.|Cpt\.|Capt\.|Captain)\s+([A-Z][\w'-]+)(?:\s+([A-Z][\w'-]+))?")
        .unwrap()
});
static RE_WEBSITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"']+"#).unwrap());

/// Extraction tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Blocks whose flattened text exceeds this many characters are skipped
    pub max_block_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

impl From<&CrawlerConfig> for ExtractionConfig {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_block_chars: config.max_block_chars,
        }
    }
}

/// Failure confined to a single block
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Block text has {chars} characters (limit {limit})")]
    BlockTooLarge { chars: usize, limit: usize },
}

/// Extracts contact records from a page and enqueues its contact links
///
/// # Arguments
///
/// * `html` - The page HTML
/// * `source` - The canonical page URL, stored in every record
/// * `frontier` - Receives discovered contact-page links
/// * `config` - Extraction limits
///
/// # Returns
///
/// Records unique within this page, in document order
pub fn extract_contacts(
    html: &str,
    source: &CanonicalUrl,
    frontier: &Frontier,
    config: &ExtractionConfig,
) -> Vec<ContactRecord> {
    let document = Html::parse_document(html);
    let mut records = Vec::new();
    let mut seen: HashSet<IdentityKey> = HashSet::new();

    if let Ok(block_selector) = Selector::parse(BLOCK_TAGS) {
        for block in document.select(&block_selector) {
            let text = flatten_text(block);
            match extract_block(&text, source, config) {
                Ok(Some(record)) => {
                    if seen.insert(record.identity_key()) {
                        records.push(record);
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::debug!("Skipping block on {}: {}", source, e),
            }
        }
    }

    let followed = enqueue_contact_links(&document, source, frontier);

    tracing::debug!(
        "Extracted {} records and {} contact links from {}",
        records.len(),
        followed,
        source
    );

    records
}

/// Joins the trimmed, non-empty text nodes under `element` with single spaces
fn flatten_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds a record from one block, `None` when it has no phone or email
pub fn extract_block(
    text: &str,
    source: &CanonicalUrl,
    config: &ExtractionConfig,
) -> Result<Option<ContactRecord>, ExtractionError> {
    let chars = text.chars().count();
    if chars > config.max_block_chars {
        return Err(ExtractionError::BlockTooLarge {
            chars,
            limit: config.max_block_chars,
        });
    }

    let phones: Vec<&str> = RE_PHONE.find_iter(text).map(|m| m.as_str()).take(2).collect();
    let emails: Vec<&str> = RE_EMAIL.find_iter(text).map(|m| m.as_str()).take(2).collect();

    let mut record = ContactRecord::new(source.as_str());
    fill(&mut record, [ContactField::Phone1, ContactField::Phone2], &phones);
    fill(&mut record, [ContactField::Email1, ContactField::Email2], &emails);
    if !record.has_channel() {
        return Ok(None);
    }

    let name_slots = [
        [
            ContactField::Salutation1,
            ContactField::FirstName1,
            ContactField::LastName1,
        ],
        [
            ContactField::Salutation2,
            ContactField::FirstName2,
            ContactField::LastName2,
        ],
    ];
    for (captures, slots) in RE_NAME.captures_iter(text).zip(name_slots) {
        for (group, field) in slots.into_iter().enumerate() {
            let value = captures.get(group + 1).map(|m| m.as_str().to_string());
            record.set(field, value);
        }
    }

    let websites: Vec<&str> = RE_WEBSITE
        .find_iter(text)
        .map(|m| trim_website(m.as_str()))
        .filter(|w| is_plausible_website(w))
        .take(2)
        .collect();
    fill(&mut record, [ContactField::Website1, ContactField::Website2], &websites);

    Ok(Some(record))
}

fn fill(record: &mut ContactRecord, slots: [ContactField; 2], values: &[&str]) {
    for (field, value) in slots.into_iter().zip(values) {
        record.set(field, Some(value.to_string()));
    }
}

fn trim_website(raw: &str) -> &str {
    raw.trim_end_matches(|c: char| ".,;:!?)]}'\"".contains(c))
}

/// Requires a dotted host after the scheme or `www.` prefix
fn is_plausible_website(website: &str) -> bool {
    let lower = website.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    host.contains('.') && !host.starts_with('.') && !host.ends_with('.')
}

/// Enqueues anchors labelled like a contact link, returning how many were new
fn enqueue_contact_links(document: &Html, source: &CanonicalUrl, frontier: &Frontier) -> usize {
    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return 0;
    };

    let base = document_base(document, source.as_url());
    let mut accepted = 0;

    for anchor in document.select(&anchor_selector) {
        let labelled = is_contact_label(&flatten_text(anchor))
            || anchor.value().attr("title").is_some_and(is_contact_label);
        if !labelled {
            continue;
        }

        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        if !is_followable_href(href) {
            continue;
        }

        match canonicalize_relative(href, &base) {
            Ok(url) => {
                tracing::trace!("Contact link on {}: {}", source, url);
                if frontier.enqueue_canonical(url) {
                    accepted += 1;
                }
            }
            Err(e) => tracing::debug!("Unusable contact link '{}' on {}: {}", href, source, e),
        }
    }

    accepted
}

/// `<base href>` resolved against the page URL, or the page URL itself
fn document_base(document: &Html, page: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|base| base.value().attr("href"))
                .and_then(|href| page.join(href.trim()).ok())
        })
        .unwrap_or_else(|| page.clone())
}

fn is_contact_label(raw: &str) -> bool {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let label = collapsed
        .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_lowercase();
    CONTACT_LABELS.contains(&label.as_str())
}

fn is_followable_href(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    !(lower.is_empty()
        || lower.starts_with('#')
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("javascript:"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::canonicalize;

    fn page() -> CanonicalUrl {
        canonicalize("https://guides.example.com/about").unwrap()
    }

    fn extract(html: &str) -> (Vec<ContactRecord>, Frontier) {
        let frontier = Frontier::new();
        let records = extract_contacts(html, &page(), &frontier, &ExtractionConfig::default());
        (records, frontier)
    }

    #[test]
    fn test_full_record_from_one_block() {
        let html = r#"<html><body>
            <div>Capt. John Smith, call (555) 123-4567 or email john@example.com</div>
        </body></html>"#;

        let (records, _) = extract(html);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.salutation1.as_deref(), Some("Capt."));
        assert_eq!(record.first_name1.as_deref(), Some("John"));
        assert_eq!(record.last_name1.as_deref(), Some("Smith"));
        assert_eq!(record.phone1.as_deref(), Some("(555) 123-4567"));
        assert_eq!(record.email1.as_deref(), Some("john@example.com"));
        assert_eq!(record.source, "https://guides.example.com/about");
    }

    #[test]
    fn test_nested_blocks_deduplicated() {
        let html = r#"<div><p>Call 555-123-4567</p></div>"#;
        let (records, _) = extract(html);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_block_without_channel_ignored() {
        let html = r#"<div>Capt. Jane Doe runs trips at www.fishing.example.com</div>"#;
        let (records, _) = extract(html);
        assert!(records.is_empty());
    }

    #[test]
    fn test_two_per_field_cap() {
        let text = "555-111-2222 555-333-4444 555-555-6666 a@x.com b@x.com c@x.com \
                    Mr. Al Smith Ms. Bea Jones Dr. Cy Young";
        let record = extract_block(text, &page(), &ExtractionConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(record.phone2.as_deref(), Some("555-333-4444"));
        assert_eq!(record.email2.as_deref(), Some("b@x.com"));
        assert_eq!(record.salutation2.as_deref(), Some("Ms."));
        assert_eq!(record.first_name2.as_deref(), Some("Bea"));
        assert_eq!(record.last_name2.as_deref(), Some("Jones"));
        let values: Vec<String> = record.identity_key().into_iter().map(|(_, v)| v).collect();
        assert!(!values.iter().any(|v| v.contains("6666") || v == "c@x.com" || v == "Cy"));
    }

    #[test]
    fn test_name_without_last_name() {
        let record = extract_block("Captain Rob 555-123-4567", &page(), &ExtractionConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(record.salutation1.as_deref(), Some("Captain"));
        assert_eq!(record.first_name1.as_deref(), Some("Rob"));
        assert_eq!(record.last_name1, None);
    }

    #[test]
    fn test_websites_trimmed() {
        let record = extract_block(
            "Book at https://bay.example.com/book. Or www.other.example.org, 555-123-4567",
            &page(),
            &ExtractionConfig::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(record.website1.as_deref(), Some("https://bay.example.com/book"));
        assert_eq!(record.website2.as_deref(), Some("www.other.example.org"));
    }

    #[test]
    fn test_oversized_block_skipped() {
        let config = ExtractionConfig { max_block_chars: 10 };
        let result = extract_block("call 555-123-4567 today", &page(), &config);
        assert!(matches!(result, Err(ExtractionError::BlockTooLarge { .. })));
    }

    #[test]
    fn test_contact_link_enqueued() {
        let html = r#"<a href="/contact-us"> Contact   Us </a>"#;
        let (_, frontier) = extract(html);
        assert_eq!(
            frontier.dequeue().unwrap().as_str(),
            "https://guides.example.com/contact-us"
        );
    }

    #[test]
    fn test_contact_link_relative_to_directory_page() {
        let source = canonicalize("https://site.example.com/guides/").unwrap();
        let frontier = Frontier::new();
        extract_contacts(
            r#"<a href="contact">Contact</a>"#,
            &source,
            &frontier,
            &ExtractionConfig::default(),
        );
        assert_eq!(
            frontier.dequeue().unwrap().as_str(),
            "https://site.example.com/guides/contact"
        );
    }

    #[test]
    fn test_contact_link_by_title_and_base() {
        let html = r#"<html><head><base href="https://cdn.example.net/site/"></head>
            <body><a href="reach" title="Get in touch!">✉</a></body></html>"#;
        let (_, frontier) = extract(html);
        assert_eq!(
            frontier.dequeue().unwrap().as_str(),
            "https://cdn.example.net/site/reach"
        );
    }

    #[test]
    fn test_non_contact_and_unfollowable_links_ignored() {
        let html = r##"
            <a href="/about">About</a>
            <a href="/contact-form">Contact the team today</a>
            <a href="mailto:a@example.com">Contact</a>
            <a href="tel:5551234567">Contact us</a>
            <a href="#contact">Contact</a>
            <a href="javascript:void(0)">Reach out</a>
        "##;
        let (_, frontier) = extract(html);
        assert_eq!(frontier.stats().total, 0);
    }
}
