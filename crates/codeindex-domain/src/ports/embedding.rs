//! Embedding provider port.

use crate::error::{Error, Result};
use crate::value_objects::Embedding;
use async_trait::async_trait;

/// Maximum number of characters of code+context sent to a provider in one
/// `embed_code` call.
pub const EMBED_CODE_MAX_CHARS: usize = 6000;

/// Contract for turning text into dense embedding vectors.
///
/// Implementations are injected by construction (no global singleton);
/// `embed` has a default that delegates to `embed_batch` with a single
/// item, matching the common-case optimization most providers don't need.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings.into_iter().next().ok_or_else(|| Error::internal("no embedding returned"))
    }

    /// Embed a batch of texts, preserving input order in the output even
    /// if the underlying provider returns results out of order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Embed a code chunk together with surrounding context, truncating
    /// the concatenation to `EMBED_CODE_MAX_CHARS`.
    async fn embed_code(&self, code: &str, context: &str) -> Result<Embedding> {
        let mut combined = String::with_capacity(context.len() + code.len() + 1);
        combined.push_str(context);
        combined.push('\n');
        combined.push_str(code);
        let truncated: String = combined.chars().take(EMBED_CODE_MAX_CHARS).collect();
        self.embed(&truncated).await
    }

    /// Dimensionality of vectors this provider produces.
    fn dimensions(&self) -> usize;

    /// Provider identifier (e.g. `"azure_openai"`, `"null"`).
    fn provider_name(&self) -> &str;
}
