//! Test Module
//!
//! Test suite for the guidance core.
//!
//! ## Test Categories
//! - `brain_tests`: Intent routing, quote counts, prompt composition and clean-up
//! - `knowledge_tests`: Corpus loading, index queries and the on-disk index cache
//! - `actor_tests`: Guidance agent turns and the session actor
//! - `supervisor_tests`: Session routing and bootstrap
//! - `chaos_test`: Timeouts, failing backends and concurrent sessions
//! - `integration_tests`: Full conversation workflows

pub mod fixtures;

pub mod integration_tests;
