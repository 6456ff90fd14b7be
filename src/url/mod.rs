//! URL handling module for Contact-Sweep
//!
//! This module provides URL canonicalization and host exclusion matching.
//! Everything here is pure: no I/O and no shared state, so it can run
//! lock-free inside concurrent callers.

mod canonical;
mod matcher;

// Re-export main functions
pub use canonical::{canonicalize, canonicalize_relative, CanonicalUrl};
pub use matcher::{matches_wildcard, HostFilter};
