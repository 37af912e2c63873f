//! LRU+TTL cache wrapping an `EmbeddingProvider`, grounded on the
//! teacher's `moka`-based cache providers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use codeindex_domain::error::Result;
use codeindex_domain::ports::EmbeddingProvider;
use codeindex_domain::value_objects::{Embedding, EmbeddingStats};
use dashmap::DashMap;
use moka::future::Cache;
use sha2::{Digest, Sha256};

/// Wraps an `EmbeddingProvider`, caching by a hash of the input text so
/// repeated chunks (common across incremental reindexes) skip the
/// network call entirely.
pub struct CachedEmbeddingProvider {
    inner: Arc<dyn EmbeddingProvider>,
    cache: Cache<String, Embedding>,
    stats: Arc<DashMap<&'static str, u64>>,
}

impl CachedEmbeddingProvider {
    /// Wrap `inner`, keeping up to `max_entries` embeddings for up to
    /// `time_to_live` before eviction.
    pub fn new(inner: Arc<dyn EmbeddingProvider>, max_entries: u64, time_to_live: Duration) -> Self {
        let cache = Cache::builder().max_capacity(max_entries).time_to_live(time_to_live).build();
        let stats = Arc::new(DashMap::new());
        stats.insert("cache_hits", 0);
        stats.insert("cache_misses", 0);
        stats.insert("embeddings_generated", 0);
        Self { inner, cache, stats }
    }

    fn cache_key(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn record(&self, counter: &'static str, delta: u64) {
        self.stats.entry(counter).and_modify(|v| *v += delta).or_insert(delta);
    }

    /// Snapshot of hit/miss/generation counters since construction.
    pub fn stats(&self) -> EmbeddingStats {
        EmbeddingStats {
            cache_hits: *self.stats.get("cache_hits").as_deref().unwrap_or(&0),
            cache_misses: *self.stats.get("cache_misses").as_deref().unwrap_or(&0),
            embeddings_generated: *self.stats.get("embeddings_generated").as_deref().unwrap_or(&0),
        }
    }

    /// Remove every cached entry.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

#[async_trait]
impl EmbeddingProvider for CachedEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let key = Self::cache_key(text);
        if let Some(cached) = self.cache.get(&key).await {
            self.record("cache_hits", 1);
            return Ok(cached);
        }
        self.record("cache_misses", 1);
        let embedding = self.inner.embed(text).await?;
        self.record("embeddings_generated", 1);
        self.cache.insert(key, embedding.clone()).await;
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut results = Vec::with_capacity(texts.len());
        let mut misses: Vec<(usize, String)> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            let key = Self::cache_key(text);
            match self.cache.get(&key).await {
                Some(cached) => {
                    self.record("cache_hits", 1);
                    results.push(Some(cached));
                }
                None => {
                    self.record("cache_misses", 1);
                    results.push(None);
                    misses.push((i, text.clone()));
                }
            }
        }

        if !misses.is_empty() {
            let miss_texts: Vec<String> = misses.iter().map(|(_, t)| t.clone()).collect();
            let fresh = self.inner.embed_batch(&miss_texts).await?;
            self.record("embeddings_generated", fresh.len() as u64);
            for ((i, text), embedding) in misses.into_iter().zip(fresh) {
                self.cache.insert(Self::cache_key(&text), embedding.clone()).await;
                results[i] = Some(embedding);
            }
        }

        Ok(results.into_iter().map(|r| r.expect("every index is filled by hit or miss path")).collect())
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}
