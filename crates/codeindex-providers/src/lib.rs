//! # codeindex-providers
//!
//! Concrete implementations of the ports `codeindex-domain` defines:
//! REST transport, search service operations, OData filter construction,
//! the three-channel hybrid search engine, embedding providers, and
//! code chunkers.
//!
//! | Port | Implementation |
//! |------|----------------|
//! | `RestClient` | `ReqwestRestClient` |
//! | `EmbeddingProvider` | `AzureOpenAiEmbeddingProvider`, `NullEmbeddingProvider`, `CachedEmbeddingProvider` |
//! | `CodeChunker` | `IntelligentChunker` (Rust AST-aware, whole-file fallback) |

pub use codeindex_domain::error::{Error, Result};

/// HTTP transport: the concrete `RestClient`.
pub mod http;

/// Search service operations built atop the `RestClient` port.
pub mod search;

/// Schema generation and negotiation.
pub mod schema;

/// Code chunking: language-aware with a whole-file fallback.
pub mod chunking;

/// Embedding provider implementations.
pub mod embedding;

/// OData filter clause construction.
pub mod filter;

/// Three-channel hybrid search engine.
pub mod hybrid_search;

/// Concurrency and inter-call spacing for outbound requests.
pub mod rate_limit;
