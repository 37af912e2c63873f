//! Per-language chunkers.

mod fallback;
mod rust;

pub use fallback::FallbackChunker;
pub use rust::RustChunker;
