//! Index document value objects.
//!
//! ## Business Rules
//!
//! - `id` is a deterministic function of `(repository, relative_path,
//!   chunk_index)`; re-indexing the same chunk must produce the same `id`
//!   so that upload is merge-or-upload idempotent.
//! - `start_line <= end_line`; for `chunk_type == File`, `start_line == 1`
//!   and `end_line` is the file's total line count.
//! - `content_vector`, when present, has a length equal to the index's
//!   configured `dimensions`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Maximum number of UTF-8 characters stored in `Document::content`.
pub const MAX_CONTENT_CHARS: usize = 32_000;

/// Soft cap on serialized document size, matched against the service's
/// hard 1 MiB batch-item limit with headroom for JSON framing.
pub const MAX_DOCUMENT_BYTES: usize = 1024 * 1024;

/// Fraction of `MAX_DOCUMENT_BYTES` a truncated document is shrunk to.
pub const TRUNCATION_SAFETY_MARGIN: f64 = 0.80;

/// The unit a chunk document represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    /// A single top-level function or method.
    Function,
    /// A class or struct-like type definition.
    Class,
    /// A whole file, used as the fallback for non-primary languages or
    /// parse failures.
    File,
}

/// A single indexable unit of source code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Content-addressed identifier: first 16 hex chars of
    /// SHA-256(`"{repository}:{file_path}:{chunk_index}"`).
    pub id: String,
    /// Chunk source text, UTF-8, truncated to `MAX_CONTENT_CHARS`/size cap.
    pub content: String,
    /// Owning repository; also the partition key for bulk deletion.
    pub repository: String,
    /// Path of the source file, relative to the repository root.
    pub file_path: String,
    /// File extension without the leading dot (e.g. `"rs"`).
    pub file_extension: String,
    /// Language tag derived from the extension.
    pub language: String,
    /// What kind of unit this document represents.
    pub chunk_type: ChunkType,
    /// `"{file_path}:{chunk_index}"`.
    pub chunk_id: String,
    /// 1-based, inclusive start line.
    pub start_line: u32,
    /// 1-based, inclusive end line.
    pub end_line: u32,
    /// Function name, when `chunk_type == Function`.
    pub function_name: Option<String>,
    /// Class name, when `chunk_type == Class`.
    pub class_name: Option<String>,
    /// Extracted signature, when available.
    pub signature: Option<String>,
    /// Extracted docstring/doc comment, when available.
    pub docstring: Option<String>,
    /// Imports referenced by the chunk.
    pub imports: Vec<String>,
    /// Dependencies referenced by the chunk.
    pub dependencies: Vec<String>,
    /// Last modification time of the source file, RFC3339 UTC.
    pub last_modified: DateTime<Utc>,
    /// Dense embedding vector, present iff embeddings are enabled.
    pub content_vector: Option<Vec<f32>>,
    /// Set when `content` was truncated to fit the size cap.
    pub truncated: bool,
}

impl Document {
    /// Derive the content-addressed document id for a chunk.
    ///
    /// `id(repo, path, i)` is the first 16 hex characters of
    /// SHA-256(`"{repo}:{path}:{i}"`); changing any of the three inputs
    /// changes the id.
    pub fn derive_id(repository: &str, relative_path: &str, chunk_index: usize) -> String {
        let key = format!("{repository}:{relative_path}:{chunk_index}");
        let digest = Sha256::digest(key.as_bytes());
        hex::encode(digest)[..16].to_string()
    }

    /// Truncate `content` in place to at most `max_chars` UTF-8
    /// characters, appending an ellipsis marker and setting `truncated`.
    /// This is independent of `enforce_size_budget`'s byte cap — a
    /// chunk can be small enough to serialize well under 1 MiB while
    /// still holding more characters than a caller wants to store.
    ///
    /// No-op if `content` already has `max_chars` characters or fewer.
    pub fn enforce_char_budget(&mut self, max_chars: usize) {
        if self.content.chars().count() <= max_chars {
            return;
        }
        let mut truncated: String = self.content.chars().take(max_chars).collect();
        truncated.push_str("…");
        self.content = truncated;
        self.truncated = true;
    }

    /// Truncate `content` in place to fit within `MAX_DOCUMENT_BYTES`,
    /// leaving `TRUNCATION_SAFETY_MARGIN` headroom for the rest of the
    /// serialized document, and mark `truncated`.
    ///
    /// No-op if the document already serializes within budget.
    pub fn enforce_size_budget(&mut self) {
        let Ok(serialized) = serde_json::to_vec(self) else { return };
        if serialized.len() <= MAX_DOCUMENT_BYTES {
            return;
        }

        let overhead = serialized.len() - self.content.len();
        let target_total = (MAX_DOCUMENT_BYTES as f64 * TRUNCATION_SAFETY_MARGIN) as usize;
        let target_content = target_total.saturating_sub(overhead);

        let mut truncated: String = self.content.chars().take(target_content).collect();
        truncated.push_str("…");
        self.content = truncated;
        self.truncated = true;
    }

    /// Whether `content_vector`, if set, matches the expected dimensions.
    pub fn vector_matches_dimensions(&self, dimensions: usize) -> bool {
        self.content_vector
            .as_ref()
            .is_none_or(|v| v.len() == dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_deterministic_and_sensitive_to_each_input() {
        let a = Document::derive_id("repo", "src/lib.rs", 0);
        let b = Document::derive_id("repo", "src/lib.rs", 0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);

        assert_ne!(a, Document::derive_id("other-repo", "src/lib.rs", 0));
        assert_ne!(a, Document::derive_id("repo", "src/main.rs", 0));
        assert_ne!(a, Document::derive_id("repo", "src/lib.rs", 1));
    }

    fn sample_document(content: String) -> Document {
        Document {
            id: "abc123".into(),
            content,
            repository: "repo".into(),
            file_path: "src/lib.rs".into(),
            file_extension: "rs".into(),
            language: "rust".into(),
            chunk_type: ChunkType::File,
            chunk_id: "src/lib.rs:0".into(),
            start_line: 1,
            end_line: 1,
            function_name: None,
            class_name: None,
            signature: None,
            docstring: None,
            imports: Vec::new(),
            dependencies: Vec::new(),
            last_modified: Utc::now(),
            content_vector: None,
            truncated: false,
        }
    }

    #[test]
    fn oversized_document_is_truncated_with_margin() {
        let huge = "x".repeat(2 * 1024 * 1024);
        let mut doc = sample_document(huge);
        doc.enforce_size_budget();

        assert!(doc.truncated);
        let serialized = serde_json::to_vec(&doc).unwrap();
        assert!(serialized.len() <= MAX_DOCUMENT_BYTES);
        assert!(doc.content.len() <= 900_000);
    }

    #[test]
    fn small_document_is_untouched() {
        let mut doc = sample_document("fn main() {}".into());
        doc.enforce_size_budget();
        assert!(!doc.truncated);
        assert_eq!(doc.content, "fn main() {}");
    }

    #[test]
    fn a_chunk_well_under_the_byte_cap_is_still_truncated_at_the_char_cap() {
        let long = "x".repeat(40_000);
        let mut doc = sample_document(long);
        doc.enforce_char_budget(MAX_CONTENT_CHARS);

        assert!(doc.truncated);
        assert!(doc.content.chars().count() <= MAX_CONTENT_CHARS);
        let serialized = serde_json::to_vec(&doc).unwrap();
        assert!(serialized.len() < MAX_DOCUMENT_BYTES);
    }

    #[test]
    fn a_chunk_within_the_char_cap_is_untouched() {
        let mut doc = sample_document("x".repeat(100));
        doc.enforce_char_budget(MAX_CONTENT_CHARS);
        assert!(!doc.truncated);
        assert_eq!(doc.content.chars().count(), 100);
    }

    #[test]
    fn vector_dimension_check() {
        let mut doc = sample_document("x".into());
        assert!(doc.vector_matches_dimensions(1536));
        doc.content_vector = Some(vec![0.0; 1536]);
        assert!(doc.vector_matches_dimensions(1536));
        assert!(!doc.vector_matches_dimensions(3072));
    }
}
