//! # codeindex
//!
//! Composition root: wires `codeindex-infrastructure`'s config/logging,
//! `codeindex-providers`' concrete `RestClient`/embedding/chunking
//! adapters, and `codeindex-application`'s automation use cases into one
//! process handle.
//!
//! This crate has no CLI of its own beyond the thin `main.rs` binary —
//! the repository ingestion orchestrator (`CliAutomation`) is a
//! collaborator for tooling, not a command surface this crate defines.

use std::sync::Arc;
use std::time::Duration;

use codeindex_application::automation::{CliAutomation, UnifiedAutomation};
use codeindex_domain::error::{Error, Result};
use codeindex_domain::ports::EmbeddingProvider;
use codeindex_domain::value_objects::FusionWeights;
use codeindex_infrastructure::config::Config;
use codeindex_infrastructure::{backup, error_ext, logging};
use codeindex_providers::chunking::IntelligentChunker;
use codeindex_providers::embedding::{AzureOpenAiEmbeddingProvider, CachedEmbeddingProvider, NullEmbeddingProvider};
use codeindex_providers::hybrid_search::HybridSearchEngine;
use codeindex_providers::http::{HttpClientConfig, ReqwestRestClient};
use codeindex_providers::rate_limit::{RateLimitedClient, RateLimiter};
use codeindex_providers::search::SearchOperations;
use reqwest::Client;

pub use codeindex_application as application;
pub use codeindex_domain as domain;
pub use codeindex_infrastructure as infrastructure;
pub use codeindex_providers as providers;

/// The concrete, rate-limited `RestClient` every `App` is built over.
pub type AppRestClient = RateLimitedClient<ReqwestRestClient>;

/// One running instance: a configured transport, embedding provider,
/// chunker, and the automation façade above them.
///
/// Lifecycle is `init → use → cleanup`: `App::init` builds the pooled
/// HTTP client and wraps it with the cross-cutting rate limiter;
/// `App::cleanup` closes the pool and flushes the embedding cache.
pub struct App {
    /// The configuration this instance was built from.
    pub config: Config,
    /// Datasource/skillset/indexer/reindex/health/data automation bundle.
    pub automation: UnifiedAutomation<AppRestClient>,
    /// Three-channel hybrid search engine over the same index.
    pub search: HybridSearchEngine<AppRestClient>,
    /// Repository ingestion orchestrator: walk, chunk, embed, bulk-upload.
    pub ingest: CliAutomation<AppRestClient, IntelligentChunker>,
    rest_client: Arc<AppRestClient>,
    embedder: Option<Arc<CachedEmbeddingProvider>>,
}

impl App {
    /// Build an `App` from `config`: validates the closed option set,
    /// installs the logging subscriber, then wires a pooled `reqwest`
    /// client (wrapped in the cross-cutting rate limiter), an embedding
    /// provider selected by `config.embedding.provider`, and the
    /// automation/search/ingest façades over both.
    pub fn init(config: Config) -> Result<Self> {
        config.validate()?;
        logging::init_logging(&config.logging)?;

        let http_client = ReqwestRestClient::new(&config.endpoint, &config.api_key, &config.api_version, HttpClientConfig::default())?;
        let limiter = RateLimiter::new(10, Duration::from_secs_f64(config.rate_limit_delay_seconds));
        let rest_client = Arc::new(RateLimitedClient::new(http_client, limiter));

        let search_ops = Arc::new(SearchOperations::new(Arc::clone(&rest_client)));
        let embedder = build_embedder(&config)?;
        let embedder_handle: Option<Arc<dyn EmbeddingProvider>> = embedder.clone().map(|e| e as Arc<dyn EmbeddingProvider>);

        let automation =
            UnifiedAutomation::new(Arc::clone(&search_ops), config.index_name.clone(), config.embedding.dimensions);
        let ingest = CliAutomation::new(Arc::clone(&search_ops), IntelligentChunker::new(), embedder_handle.clone());
        let search = HybridSearchEngine::new(search_ops, embedder_handle, FusionWeights::default());

        Ok(Self { config, automation, search, ingest, rest_client, embedder })
    }

    /// Close the HTTP connection pool and flush the embedding cache.
    /// Call once at shutdown; any automation/search handle still held
    /// elsewhere becomes unusable afterward.
    pub fn cleanup(self) {
        if let Some(embedder) = &self.embedder {
            embedder.clear();
        }
        drop(self.rest_client);
        drop(self.automation);
        drop(self.search);
        drop(self.ingest);
    }
}

fn build_embedder(config: &Config) -> Result<Option<Arc<CachedEmbeddingProvider>>> {
    let Some(provider) = &config.embedding.provider else {
        return Ok(None);
    };
    if provider != "azure_openai" {
        return Err(Error::config(format!("unsupported embedding.provider {provider:?}")));
    }

    // The closed configuration set carries no embedding-specific
    // endpoint/model fields, so the deployment is assumed to live on the
    // same resource as the search service, named by convention from the
    // configured dimensionality.
    let model = match config.embedding.dimensions {
        3072 => "text-embedding-3-large",
        _ => "text-embedding-3-small",
    };
    let client = Client::builder().build().map_err(|e| Error::config(format!("failed to build embedding HTTP client: {e}")))?;
    let inner = Arc::new(AzureOpenAiEmbeddingProvider::new(
        client,
        &config.endpoint,
        &config.api_key,
        model,
        config.embedding.dimensions,
        Duration::from_secs(30),
    ));
    Ok(Some(Arc::new(CachedEmbeddingProvider::new(inner, 10_000, Duration::from_secs(3600)))))
}

/// An embedding provider that never produces vectors, for configurations
/// with `embedding.provider = null` that still need an `EmbeddingProvider`
/// handle (e.g. keyword-only search wiring in tests).
pub fn null_embedder() -> Arc<dyn EmbeddingProvider> {
    Arc::new(NullEmbeddingProvider::new())
}

/// Re-exported so callers wiring schema backups don't need a direct
/// `codeindex-infrastructure` dependency.
pub use backup::{read_backup, write_backup};
pub use error_ext::{ErrorContext, IoErrorContext};
