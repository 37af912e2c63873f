//! Embedding provider implementations.

mod azure_openai;
mod cache;
mod null;

pub use azure_openai::AzureOpenAiEmbeddingProvider;
pub use cache::CachedEmbeddingProvider;
pub use null::{NullEmbeddingProvider, NULL_EMBEDDING_DIMENSIONS};
