//! Integration tests for Contact-Sweep
//!
//! These tests use wiremock to create mock HTTP servers and run the real
//! `HttpFetcher` and full pipeline against them.

mod sweep_tests;
