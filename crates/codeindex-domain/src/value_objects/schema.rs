//! Index schema and pipeline-resource value objects.
//!
//! These mirror the wire shapes the managed search service expects
//! (`PUT /indexes/{name}`, `/datasources`, `/skillsets`, `/indexers`) but
//! are otherwise opaque structural data to the core — the core negotiates
//! and diffs them, it does not interpret their business meaning.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Similarity metric for a vector search algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VectorMetric {
    /// Cosine similarity.
    Cosine,
    /// Euclidean (L2) distance.
    Euclidean,
    /// Dot product similarity.
    DotProduct,
}

/// HNSW parameters for one vector search algorithm configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HnswAlgorithm {
    /// Algorithm configuration name, referenced by a vector profile.
    pub name: String,
    /// Number of bi-directional links per node.
    pub m: u32,
    /// Size of the dynamic candidate list during index construction.
    pub ef_construction: u32,
    /// Size of the dynamic candidate list during search.
    pub ef_search: u32,
    /// Similarity metric used by this algorithm.
    pub metric: VectorMetric,
}

/// Binding of a vector field to an algorithm configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorSearchProfile {
    /// Profile name, referenced by a vector field.
    pub name: String,
    /// Name of the `HnswAlgorithm` this profile uses.
    pub algorithm: String,
}

/// Top-level `vectorSearch` section of an index schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorSearchConfig {
    /// Declared HNSW algorithm configurations.
    pub algorithms: Vec<HnswAlgorithm>,
    /// Declared vector search profiles.
    pub profiles: Vec<VectorSearchProfile>,
}

/// Semantic configuration field roles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticPrioritizedFields {
    /// Field supplying the result title.
    pub title_field: Option<String>,
    /// Fields supplying body content for extractive answers/captions.
    pub content_fields: Vec<String>,
    /// Fields supplying keywords.
    pub keywords_fields: Vec<String>,
}

/// A single named semantic configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticConfiguration {
    /// Configuration name (e.g. `"semantic-config"`).
    pub name: String,
    /// Field-role assignment for the reranker.
    pub prioritized_fields: SemanticPrioritizedFields,
}

/// Top-level `semantic` section of an index schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticConfig {
    /// Declared semantic configurations.
    pub configurations: Vec<SemanticConfiguration>,
}

/// A scoring profile; parameters are opaque to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringProfile {
    /// Profile name.
    pub name: String,
    /// Provider-specific function parameters, passed through verbatim.
    #[serde(default)]
    pub functions: serde_json::Value,
}

/// A suggester definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggester {
    /// Suggester name.
    pub name: String,
    /// Source fields for suggestions.
    pub source_fields: Vec<String>,
}

/// CORS configuration, passed through verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsOptions {
    /// Allowed origins.
    pub allowed_origins: Vec<String>,
}

/// Scalar field data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// UTF-8 string.
    String,
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// Double-precision float.
    Double,
    /// Boolean.
    Boolean,
    /// RFC3339 date-time.
    DateTimeOffset,
    /// Collection of strings.
    StringCollection,
    /// Dense vector of single-precision floats.
    SingleCollection,
}

/// One field of an index schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field data type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether this is the index's primary key. Exactly one field per
    /// schema has `key == true`.
    #[serde(default)]
    pub key: bool,
    /// Whether the field participates in full-text search.
    #[serde(default)]
    pub searchable: bool,
    /// Whether the field can appear in `$filter` expressions.
    #[serde(default)]
    pub filterable: bool,
    /// Whether the field can appear in `$orderby`.
    #[serde(default)]
    pub sortable: bool,
    /// Whether the field can be faceted.
    #[serde(default)]
    pub facetable: bool,
    /// Whether the field is returned in results.
    #[serde(default = "default_true")]
    pub retrievable: bool,
    /// Vector dimensionality, for vector fields.
    pub dimensions: Option<usize>,
    /// Vector search profile name, for vector fields.
    pub vector_search_profile: Option<String>,
    /// Analyzer name, for searchable string fields.
    pub analyzer: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Field {
    /// The literal string `"id"`; the conventional key field name.
    pub fn key_field(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::String,
            key: true,
            searchable: false,
            filterable: false,
            sortable: false,
            facetable: false,
            retrievable: true,
            dimensions: None,
            vector_search_profile: None,
            analyzer: None,
        }
    }
}

/// A complete index schema definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSchema {
    /// Index name.
    pub name: String,
    /// Ordered field list. Exactly one field must have `key == true`.
    pub fields: Vec<Field>,
    /// Optional vector search configuration.
    pub vector_search: Option<VectorSearchConfig>,
    /// Optional semantic configuration.
    pub semantic: Option<SemanticConfig>,
    /// Optional scoring profiles.
    #[serde(default)]
    pub scoring_profiles: Vec<ScoringProfile>,
    /// Optional suggesters.
    #[serde(default)]
    pub suggesters: Vec<Suggester>,
    /// Optional CORS configuration.
    pub cors_options: Option<CorsOptions>,
}

impl IndexSchema {
    /// The schema's key field, if present.
    pub fn key_field(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.key)
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Structural description of a datasource connection. Opaque to the core
/// beyond its name and connection string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    /// Datasource name, unique within the service.
    pub name: String,
    /// Datasource type (e.g. `"azureblob"`).
    #[serde(rename = "type")]
    pub source_type: String,
    /// Connection string, never logged.
    pub connection_string: String,
    /// Container/table name within the datasource.
    pub container: String,
}

/// A skill within a skillset pipeline, represented as a tagged variant
/// with parameters rather than an inheritance hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Skill {
    /// Splits large text into smaller pages.
    SplitSkill {
        /// Target page length in characters.
        page_length: usize,
    },
    /// Detects the natural language of the input text.
    LanguageDetectionSkill,
    /// Generates an embedding vector for the input text.
    EmbeddingSkill {
        /// Embedding model identifier.
        model: String,
    },
}

/// An ordered enrichment pipeline applied during indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skillset {
    /// Skillset name, unique within the service.
    pub name: String,
    /// Ordered skills.
    pub skills: Vec<Skill>,
}

/// The service's scheduled or on-demand indexing orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indexer {
    /// Indexer name, unique within the service.
    pub name: String,
    /// Name of the datasource this indexer reads from.
    pub data_source_name: String,
    /// Name of the target index.
    pub target_index_name: String,
    /// Name of the skillset to run, if any.
    pub skillset_name: Option<String>,
    /// ISO-8601 duration schedule interval (e.g. `"PT1H"`).
    pub schedule: Option<String>,
    /// Document parsing mode.
    #[serde(default = "default_parsing_mode")]
    pub parsing_mode: String,
    /// Maximum tolerated failed items across the whole run (0 = none).
    #[serde(default)]
    pub max_failed_items: i32,
    /// Maximum tolerated failed items per batch (0 = none).
    #[serde(default)]
    pub max_failed_items_per_batch: i32,
}

fn default_parsing_mode() -> String {
    "default".to_string()
}

/// Execution status of one indexer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexerExecutionStatus {
    /// Completed without fatal failure.
    Success,
    /// Completed with recoverable per-item failures.
    TransientFailure,
    /// Failed.
    Error,
    /// Currently running.
    InProgress,
    /// Queued but not started.
    Reset,
}

impl IndexerExecutionStatus {
    /// Whether this status ends a poll loop (success, transientFailure, or error).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::TransientFailure | Self::Error)
    }
}

/// Result of one indexer execution, as reported by `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerExecutionResult {
    /// Terminal or in-progress status of the run.
    pub status: IndexerExecutionStatus,
    /// Number of items processed.
    pub item_count: u64,
    /// Number of items that failed.
    pub failed_item_count: u64,
    /// Start time of the run, RFC3339 UTC.
    pub start_time: chrono::DateTime<chrono::Utc>,
    /// End time of the run, RFC3339 UTC, if finished.
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    /// Error message, if `status == Error`.
    pub error_message: Option<String>,
}

/// Extra provider-specific settings threaded through registry configs.
pub type ExtraSettings = HashMap<String, String>;
