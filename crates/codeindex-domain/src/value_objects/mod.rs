//! Value objects shared across the core.

mod document;
mod embedding;
mod filter;
mod schema;
mod search;

pub use document::{ChunkType, Document, MAX_CONTENT_CHARS, MAX_DOCUMENT_BYTES, TRUNCATION_SAFETY_MARGIN};
pub use embedding::{Embedding, EmbeddingStats};
pub use filter::FilterExpr;
pub use schema::{
    CorsOptions, DataSource, Field, FieldType, HnswAlgorithm, IndexSchema, Indexer,
    IndexerExecutionResult, IndexerExecutionStatus, ScoringProfile, SemanticConfig,
    SemanticConfiguration, SemanticPrioritizedFields, Skill, Skillset, Suggester, VectorMetric,
    VectorSearchConfig, VectorSearchProfile,
};
pub use search::{ChannelHit, FusedResult, FusionWeights};
