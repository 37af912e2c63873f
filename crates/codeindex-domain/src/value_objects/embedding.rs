//! Embedding value objects.

use serde::{Deserialize, Serialize};

/// A dense text embedding vector.
///
/// ## Business Rules
///
/// - `vector` must contain at least one element.
/// - `dimensions` equals `vector.len()`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embedding {
    /// The embedding values.
    pub vector: Vec<f32>,
    /// Name of the model that produced this embedding.
    pub model: String,
    /// Vector dimensionality.
    pub dimensions: usize,
}

impl Embedding {
    /// Build an embedding, deriving `dimensions` from the vector length.
    pub fn new(vector: Vec<f32>, model: impl Into<String>) -> Self {
        let dimensions = vector.len();
        Self { vector, model: model.into(), dimensions }
    }
}

/// Aggregate statistics for an embedding cache.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EmbeddingStats {
    /// Number of cache hits.
    pub cache_hits: u64,
    /// Number of cache misses.
    pub cache_misses: u64,
    /// Number of embeddings actually generated by the provider.
    pub embeddings_generated: u64,
}
