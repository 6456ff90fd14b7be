//! Email address syntax validation

use crate::cleaning::CleaningError;

/// Validates an email address and returns its canonical form
///
/// The local part is kept as written; the domain is lowercased. Requires
/// exactly one `@`, a non-empty local part and a dotted domain whose labels
/// are alphanumeric or hyphens.
pub fn standardize_email(raw: &str) -> Result<String, CleaningError> {
    let email = raw.trim().trim_end_matches('.');
    let invalid = |reason: &str| CleaningError::InvalidEmail {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    if email.is_empty() {
        return Err(invalid("empty address"));
    }

    let (local, domain) = match email.split_once('@') {
        Some((local, domain)) if !domain.contains('@') => (local, domain),
        _ => return Err(invalid("expected exactly one '@'")),
    };

    if local.is_empty() {
        return Err(invalid("empty local part"));
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err(invalid("misplaced '.' in local part"));
    }
    if !local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_.+-".contains(c))
    {
        return Err(invalid("invalid characters in local part"));
    }

    if !domain.contains('.') {
        return Err(invalid("domain has no dot"));
    }

    for label in domain.split('.') {
        if label.is_empty() || label.starts_with('-') || label.ends_with('-') {
            return Err(invalid("malformed domain label"));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(invalid("invalid characters in domain"));
        }
    }

    // TLDs are alphabetic
    let tld = domain.rsplit('.').next().unwrap_or_default();
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid("invalid top-level domain"));
    }

    Ok(format!("{}@{}", local, domain.to_ascii_lowercase()))
}
