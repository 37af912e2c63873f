//! Ports: traits the application layer depends on and the providers layer
//! implements.

mod chunker;
mod embedding;
mod rest;

pub use chunker::{ChunkingOptions, ChunkingResult, CodeChunker};
pub use embedding::{EmbeddingProvider, EMBED_CODE_MAX_CHARS};
pub use rest::{HttpMethod, QueryParam, RestClient};
