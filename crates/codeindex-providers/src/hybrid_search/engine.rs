//! Hybrid search engine combining semantic, keyword, vector, and an
//! exact-term fallback channel into one deterministic ranking.
//!
//! # Architecture
//!
//! ```text
//! Query Input
//!     |
//!     v
//! Parallel Channels (each deadline-bounded):
//!     +-> Semantic/Keyword (single REST call, semantic ranker)
//!     +-> Exact-term fallback (filter-only pass, quoted/numeric tokens)
//!     +-> Vector (REST call with an embedded query vector)
//!
//! Score Fusion:
//!     base weight   = semantic_weight iff the hit carries a reranker score,
//!                     else keyword_weight
//!     vector weight = vector_weight, applied independently
//!     exact boost   = max(score, 1.0) * exact_boost, additive
//!
//! Rank Results (score descending, id ascending tie-break)
//!     |
//!     v
//! Return Top-K Results
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use codeindex_domain::ports::{EmbeddingProvider, RestClient};
use codeindex_domain::value_objects::{ChannelHit, FilterExpr, FusedResult, FusionWeights};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::filter::FilterManager;
use crate::search::SearchOperations;

/// Maximum length, in characters, of a single extracted exact-match term
/// before it is clamped, bounding how much of a pathological query can
/// land in a single filter clause.
const EXACT_TERM_MAX_CHARS: usize = 200;

/// Substrings that mark a term as a suspicious filter-injection attempt;
/// any exact term containing one (case-insensitively) is replaced with a
/// no-match clause instead of being rendered into the filter.
const SUSPICIOUS_PATTERNS: [&str; 13] =
    [" or ", " and ", " eq ", " ne ", " gt ", " lt ", " ge ", " le ", "(", ")", "--", "/*", "*/"];

/// Runs the three-channel hybrid search and fuses the results.
pub struct HybridSearchEngine<C: RestClient> {
    search_ops: Arc<SearchOperations<C>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    weights: FusionWeights,
}

impl<C: RestClient> HybridSearchEngine<C> {
    /// Build an engine against `search_ops`. `embedder` is optional: when
    /// absent, the vector channel is skipped and its weight contributes
    /// nothing, so the engine degrades gracefully to keyword-only search.
    pub fn new(
        search_ops: Arc<SearchOperations<C>>,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
        weights: FusionWeights,
    ) -> Self {
        Self { search_ops, embedder, weights }
    }

    /// Run the full hybrid search for `query` against `index_name`,
    /// returning up to `top_k` fused results sorted by score (ties broken
    /// by ascending id). The whole search, across all three channels, is
    /// bounded by `deadline`.
    pub async fn search(
        &self,
        index_name: &str,
        query: &str,
        filter: Option<&FilterExpr>,
        top_k: usize,
        deadline: Duration,
        cancel: &CancellationToken,
    ) -> Vec<FusedResult> {
        if top_k == 0 {
            return Vec::new();
        }

        let filter_str = filter.map(FilterExpr::render);
        let exact_terms = extract_exact_terms(query);

        let (kw_sem, exact, vector) = tokio::join!(
            run_bounded(
                deadline,
                self.keyword_semantic_channel(index_name, query, filter_str.as_deref(), top_k, cancel)
            ),
            run_bounded(
                deadline,
                self.exact_channel(index_name, &exact_terms, filter_str.as_deref(), top_k, cancel)
            ),
            run_bounded(
                deadline,
                self.vector_channel(index_name, query, filter_str.as_deref(), top_k, cancel)
            ),
        );

        let mut by_id: HashMap<String, FusedResult> = HashMap::new();

        for hit in kw_sem.unwrap_or_default() {
            let weight =
                if hit.has_reranker_score { self.weights.semantic } else { self.weights.keyword };
            accumulate(&mut by_id, hit, weight, false);
        }
        for hit in vector.unwrap_or_default() {
            accumulate(&mut by_id, hit, self.weights.vector, false);
        }
        for hit in exact.unwrap_or_default() {
            let boost = hit.score.max(1.0) * self.weights.exact_boost;
            accumulate(&mut by_id, hit, boost, true);
        }

        let mut fused: Vec<FusedResult> = by_id.into_values().collect();
        fused.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        fused.truncate(top_k);
        fused
    }

    async fn keyword_semantic_channel(
        &self,
        index_name: &str,
        query: &str,
        filter: Option<&str>,
        top_k: usize,
        cancel: &CancellationToken,
    ) -> Vec<ChannelHit> {
        let mut body = json!({
            "search": query,
            "queryType": "semantic",
            "semanticConfiguration": "semantic-config",
            "queryCaption": "extractive",
            "queryAnswer": "extractive",
            "top": top_k * 2,
            "includeTotalCount": true,
        });
        if let Some(filter) = filter {
            body["filter"] = json!(filter);
        }
        match self.search_ops.search(index_name, &body, cancel).await {
            Ok(response) => process_results(&response),
            Err(e) => {
                tracing::warn!(error = %e, "keyword/semantic channel failed");
                Vec::new()
            }
        }
    }

    async fn exact_channel(
        &self,
        index_name: &str,
        exact_terms: &[String],
        filter: Option<&str>,
        top_k: usize,
        cancel: &CancellationToken,
    ) -> Vec<ChannelHit> {
        if exact_terms.is_empty() {
            return Vec::new();
        }
        let filter_manager = FilterManager::new(crate::filter::FilterManagerConfig::default());
        let exact_clause = match filter_manager.exact_terms(exact_terms) {
            Some(clause) => clause,
            None => return Vec::new(),
        };
        let combined = match filter {
            Some(existing) => FilterExpr::And(vec![FilterExpr::Raw(existing.to_string()), exact_clause]),
            None => exact_clause,
        };
        let body = json!({
            "search": "*",
            "filter": combined.render(),
            "top": top_k * 2,
            "includeTotalCount": false,
        });
        match self.search_ops.search(index_name, &body, cancel).await {
            Ok(response) => process_results(&response),
            Err(e) => {
                tracing::warn!(error = %e, "exact-match fallback channel failed");
                Vec::new()
            }
        }
    }

    async fn vector_channel(
        &self,
        index_name: &str,
        query: &str,
        filter: Option<&str>,
        top_k: usize,
        cancel: &CancellationToken,
    ) -> Vec<ChannelHit> {
        let Some(embedder) = &self.embedder else {
            return Vec::new();
        };
        let embedding = match embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(error = %e, "failed to embed query for vector channel");
                return Vec::new();
            }
        };
        let mut body = json!({
            "search": "",
            "vectorQueries": [{
                "vector": embedding.vector,
                "k": top_k * 2,
                "fields": "content_vector",
                "kind": "vector",
            }],
            "top": top_k * 2,
            "includeTotalCount": false,
        });
        if let Some(filter) = filter {
            body["filter"] = json!(filter);
        }
        match self.search_ops.search(index_name, &body, cancel).await {
            Ok(response) => process_results(&response),
            Err(e) => {
                tracing::warn!(error = %e, "vector channel failed");
                Vec::new()
            }
        }
    }
}

/// Detect quoted phrases and bare numeric tokens of length >= 2 as exact
/// terms, clamp each to `EXACT_TERM_MAX_CHARS` printable ASCII characters.
fn extract_exact_terms(query: &str) -> Vec<String> {
    let mut terms = Vec::new();

    let mut chars = query.chars().peekable();
    let mut current_quote: Option<char> = None;
    let mut buffer = String::new();
    while let Some(c) = chars.next() {
        match current_quote {
            Some(q) if c == q => {
                if !buffer.is_empty() {
                    terms.push(std::mem::take(&mut buffer));
                }
                current_quote = None;
            }
            Some(_) => buffer.push(c),
            None if c == '"' || c == '\'' => current_quote = Some(c),
            None => {}
        }
    }

    for token in query.split_whitespace() {
        let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() == token.len() && digits.len() >= 2 {
            terms.push(token.to_string());
        }
    }

    terms
        .into_iter()
        .map(|t| clamp_term(&t))
        .filter(|t| !t.is_empty())
        .collect()
}

fn clamp_term(term: &str) -> String {
    term.chars().take(EXACT_TERM_MAX_CHARS).filter(|c| (' '..='~').contains(c)).collect()
}

/// Whether `term` (lowercased) contains any pattern considered a filter
/// injection attempt. `FilterManager::exact_terms` checks every term
/// against this before rendering, substituting `FilterExpr::NoMatch` for
/// any hit instead of the term's normal `is_match` clause.
pub fn is_suspicious(term: &str) -> bool {
    let lower = term.to_lowercase();
    SUSPICIOUS_PATTERNS.iter().any(|p| lower.contains(p))
}

fn process_results(response: &Value) -> Vec<ChannelHit> {
    let Some(values) = response["value"].as_array() else {
        return Vec::new();
    };
    values
        .iter()
        .filter_map(|doc| {
            let id = doc["id"].as_str()?.to_string();
            let score = doc["@search.score"].as_f64().unwrap_or(0.0) as f64;
            let has_reranker_score = doc.get("@search.rerankerScore").is_some();
            let content = doc["content"].as_str().unwrap_or_default().to_string();
            let file_path = doc["file_path"].as_str().unwrap_or_default().to_string();
            let repository = doc["repository"].as_str().unwrap_or_default().to_string();
            Some(ChannelHit { id, score, content, file_path, repository, has_reranker_score })
        })
        .collect()
}

fn accumulate(by_id: &mut HashMap<String, FusedResult>, hit: ChannelHit, weight: f64, is_exact_boost: bool) {
    let contribution = if is_exact_boost { weight } else { hit.score * weight };
    by_id
        .entry(hit.id.clone())
        .and_modify(|existing| {
            existing.score += contribution;
            if is_exact_boost {
                existing.exact_match = true;
            }
        })
        .or_insert_with(|| FusedResult {
            id: hit.id,
            score: contribution,
            content: hit.content,
            file_path: hit.file_path,
            repository: hit.repository,
            exact_match: is_exact_boost,
        });
}

async fn run_bounded<F, T>(deadline: Duration, fut: F) -> Option<T>
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(deadline, fut).await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use codeindex_domain::ports::{HttpMethod, QueryParam};
    use std::sync::Mutex;

    /// A `RestClient` fake that records the last `search` body it received
    /// and answers every call with a fixed two-document response, scored
    /// so `A` ("def authenticate(user): return True") outranks `B`
    /// ("class AuthManager: pass") for the query "authenticate".
    struct FakeSearchClient {
        last_filter: Mutex<Option<String>>,
    }

    impl FakeSearchClient {
        fn new() -> Self {
            Self { last_filter: Mutex::new(None) }
        }
    }

    #[async_trait]
    impl RestClient for FakeSearchClient {
        async fn request(
            &self,
            _method: HttpMethod,
            path: &str,
            _query: &[QueryParam<'_>],
            body: Option<&Value>,
            _cancel: &CancellationToken,
        ) -> codeindex_domain::error::Result<Value> {
            assert!(path.ends_with("/docs/search"));
            let body = body.expect("search always sends a body");
            *self.last_filter.lock().unwrap() = body["filter"].as_str().map(str::to_string);
            Ok(json!({
                "value": [
                    {
                        "id": "A",
                        "@search.score": 2.0,
                        "@search.rerankerScore": 2.0,
                        "content": "def authenticate(user): return True",
                        "file_path": "auth.py",
                        "repository": "demo",
                    },
                    {
                        "id": "B",
                        "@search.score": 1.0,
                        "@search.rerankerScore": 1.0,
                        "content": "class AuthManager: pass",
                        "file_path": "manager.py",
                        "repository": "demo",
                    },
                ],
            }))
        }
    }

    fn engine() -> HybridSearchEngine<FakeSearchClient> {
        let search_ops = Arc::new(SearchOperations::new(Arc::new(FakeSearchClient::new())));
        HybridSearchEngine::new(search_ops, None, FusionWeights { semantic: 0.4, keyword: 0.2, vector: 0.4, exact_boost: 0.35 })
    }

    /// A `RestClient` that panics if `request` is ever called — used to
    /// prove a code path never issues an HTTP call.
    struct PanicIfCalledClient;

    #[async_trait]
    impl RestClient for PanicIfCalledClient {
        async fn request(
            &self,
            _method: HttpMethod,
            _path: &str,
            _query: &[QueryParam<'_>],
            _body: Option<&Value>,
            _cancel: &CancellationToken,
        ) -> codeindex_domain::error::Result<Value> {
            panic!("search_ops.request was called for a top_k=0 search");
        }
    }

    #[tokio::test]
    async fn a_top_k_of_zero_returns_empty_without_issuing_any_http_call() {
        let search_ops = Arc::new(SearchOperations::new(Arc::new(PanicIfCalledClient)));
        let engine = HybridSearchEngine::new(search_ops, None, FusionWeights::default());

        let results = engine
            .search("code-index", "authenticate", None, 0, Duration::from_secs(5), &CancellationToken::new())
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn two_consecutive_searches_over_an_unchanged_index_rank_identically() {
        let engine = engine();
        let first = engine
            .search("code-index", "authenticate", None, 2, Duration::from_secs(5), &CancellationToken::new())
            .await;
        let second = engine
            .search("code-index", "authenticate", None, 2, Duration::from_secs(5), &CancellationToken::new())
            .await;

        let first_ids: Vec<&str> = first.iter().map(|r| r.id.as_str()).collect();
        let second_ids: Vec<&str> = second.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(first_ids, vec!["A", "B"]);
        assert_eq!(first_ids, second_ids);
    }

    #[tokio::test]
    async fn an_injected_exact_term_is_neutralized_before_it_reaches_the_service() {
        let client = Arc::new(FakeSearchClient::new());
        let search_ops = Arc::new(SearchOperations::new(client.clone()));
        let engine = HybridSearchEngine::new(search_ops, None, FusionWeights::default());
        let exact_terms = vec!["' or '1'='1".to_string()];

        engine.exact_channel("code-index", &exact_terms, None, 2, &CancellationToken::new()).await;

        let captured = client.last_filter.lock().unwrap().clone().expect("search was called");
        assert_eq!(captured, "(1 eq 0)");
        assert!(!captured.contains("1'='1"));
    }

    #[test]
    fn extracts_quoted_and_numeric_terms() {
        let terms = extract_exact_terms("find \"parse_config\" near 1234");
        assert!(terms.contains(&"parse_config".to_string()));
        assert!(terms.contains(&"1234".to_string()));
    }

    #[test]
    fn single_digit_numbers_are_not_exact_terms() {
        let terms = extract_exact_terms("version 5 release");
        assert!(!terms.contains(&"5".to_string()));
    }

    #[test]
    fn clamp_strips_non_printable_and_truncates() {
        let long = "a".repeat(300);
        let clamped = clamp_term(&long);
        assert_eq!(clamped.len(), EXACT_TERM_MAX_CHARS);
    }

    #[test]
    fn suspicious_detects_injection_attempts() {
        assert!(is_suspicious("x' or '1'='1"));
        assert!(!is_suspicious("parse_config"));
    }

    #[test]
    fn deterministic_tie_break_orders_by_id() {
        let mut by_id = HashMap::new();
        by_id.insert(
            "b".to_string(),
            FusedResult {
                id: "b".to_string(),
                score: 1.0,
                content: String::new(),
                file_path: String::new(),
                repository: String::new(),
                exact_match: false,
            },
        );
        by_id.insert(
            "a".to_string(),
            FusedResult {
                id: "a".to_string(),
                score: 1.0,
                content: String::new(),
                file_path: String::new(),
                repository: String::new(),
                exact_match: false,
            },
        );
        let mut fused: Vec<FusedResult> = by_id.into_values().collect();
        fused.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        assert_eq!(fused[0].id, "a");
        assert_eq!(fused[1].id, "b");
    }
}
