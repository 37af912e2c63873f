//! # codeindex-application
//!
//! Automation use cases built over `codeindex-providers`' search
//! operations: bulk document lifecycle, indexer pipelines, reindex
//! strategies, health rollups, and the repository ingestion orchestrator.
//!
//! Every use case is generic over `RestClient` so tests can substitute an
//! in-memory fake without touching this layer (see `tests/scenarios.rs`).

pub use codeindex_domain::error::{Error, Result};

/// Bulk upload, cleanup, reindex, health, and repository ingestion use cases.
pub mod automation;
