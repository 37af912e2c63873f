//! Deterministic, offline embedding provider for tests and dry runs.

use async_trait::async_trait;
use codeindex_domain::error::Result;
use codeindex_domain::ports::EmbeddingProvider;
use codeindex_domain::value_objects::Embedding;

/// Vector width produced by `NullEmbeddingProvider`.
pub const NULL_EMBEDDING_DIMENSIONS: usize = 384;

/// Returns fixed-size vectors derived from a hash of the input text.
///
/// Has no external dependencies and always succeeds, which makes it the
/// default provider for tests and for dry-run reindex operations that
/// exercise the ingestion pipeline without spending real embedding calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEmbeddingProvider;

impl NullEmbeddingProvider {
    /// Build a null provider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmbeddingProvider for NullEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let hash: u32 = text.chars().map(|c| c as u32).sum();
                let base = f32::from(u16::try_from(hash % 1000).unwrap_or(0)) / 1000.0;
                let vector: Vec<f32> = (0..NULL_EMBEDDING_DIMENSIONS)
                    .map(|j| {
                        #[allow(clippy::cast_precision_loss)]
                        let variation = ((i + j) as f32 * 0.01).sin();
                        (base + variation * 0.1).clamp(0.0, 1.0)
                    })
                    .collect();
                Embedding::new(vector, "null-test")
            })
            .collect())
    }

    fn dimensions(&self) -> usize {
        NULL_EMBEDDING_DIMENSIONS
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}
