//! Code chunking port.

use crate::error::Result;
use crate::value_objects::Document;
use async_trait::async_trait;

/// Knobs controlling how a file is split into chunks.
#[derive(Debug, Clone)]
pub struct ChunkingOptions {
    /// Repository name stamped onto every produced `Document`.
    pub repository: String,
    /// Maximum characters per chunk before the size budget kicks in.
    pub max_chunk_chars: usize,
    /// Whether to fall back to a whole-file chunk when no language-aware
    /// splitter is available for the file's extension.
    pub fallback_to_whole_file: bool,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            repository: String::new(),
            max_chunk_chars: crate::value_objects::MAX_CONTENT_CHARS,
            fallback_to_whole_file: true,
        }
    }
}

/// Outcome of chunking a single file.
#[derive(Debug, Clone, Default)]
pub struct ChunkingResult {
    /// Documents produced, in file order.
    pub documents: Vec<Document>,
    /// `true` when the language-aware path ran; `false` when the
    /// whole-file fallback produced the documents instead.
    pub used_language_parser: bool,
}

/// Contract for splitting a file's content into indexable `Document`s.
///
/// A chunker only ever sees one file at a time; the repository walk that
/// feeds it files, and the ordering of files across a repository, live in
/// the application layer.
#[async_trait]
pub trait CodeChunker: Send + Sync {
    /// Split `content` (the file at `relative_path`) into documents.
    ///
    /// `chunk_index` in each produced `Document::id` is the position of
    /// the chunk within this file, not within the repository.
    async fn chunk_file(
        &self,
        relative_path: &str,
        content: &str,
        options: &ChunkingOptions,
    ) -> Result<ChunkingResult>;

    /// File extensions (without the leading dot) this chunker can parse
    /// with its language-aware path, e.g. `["rs"]`.
    fn supported_extensions(&self) -> &[&str];
}
