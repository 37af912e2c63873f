//! End-to-end scenario tests over the automation layer, backed by an
//! in-memory fake `RestClient`.
//!
//! Run with: `cargo test -p codeindex-application --test scenarios`

#[path = "scenarios/support.rs"]
mod support;

#[path = "scenarios/drop_rebuild.rs"]
mod drop_rebuild;

#[path = "scenarios/repository_idempotence.rs"]
mod repository_idempotence;

#[path = "scenarios/indexer_rollback.rs"]
mod indexer_rollback;

#[path = "scenarios/payload_truncation.rs"]
mod payload_truncation;
