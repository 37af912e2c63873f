//! Three-channel hybrid search engine.

mod engine;

pub use engine::{is_suspicious, HybridSearchEngine};
