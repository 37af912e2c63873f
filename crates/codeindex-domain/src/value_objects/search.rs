//! Search-related value objects.

use serde::{Deserialize, Serialize};

/// A single ranked, fused search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FusedResult {
    /// Document id.
    pub id: String,
    /// Final fused score, highest first.
    pub score: f64,
    /// Matched content.
    pub content: String,
    /// Source file path.
    pub file_path: String,
    /// Repository the match came from.
    pub repository: String,
    /// Whether this result also matched the exact-term fallback pass.
    pub exact_match: bool,
}

/// Per-channel weights used to fuse hybrid search results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FusionWeights {
    /// Weight applied to items with a semantic reranker score.
    pub semantic: f64,
    /// Weight applied to items from the lexical channel with no reranker
    /// score.
    pub keyword: f64,
    /// Weight applied to items from the vector channel.
    pub vector: f64,
    /// Additive boost applied to items also present in the exact-term pass.
    pub exact_boost: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self { semantic: 0.4, keyword: 0.2, vector: 0.4, exact_boost: 0.35 }
    }
}

/// One raw hit as returned by a single search channel, before fusion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelHit {
    /// Document id.
    pub id: String,
    /// Channel-local relevance score.
    pub score: f64,
    /// Matched content.
    pub content: String,
    /// Source file path.
    pub file_path: String,
    /// Repository the match came from.
    pub repository: String,
    /// Set when the service attached a semantic reranker score
    /// (`@search.rerankerScore`) to this hit.
    pub has_reranker_score: bool,
}
