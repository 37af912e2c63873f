//! Dispatches each file to its language-aware chunker, or to the
//! whole-file fallback when none applies.

pub mod language;

use async_trait::async_trait;
use codeindex_domain::error::Result;
use codeindex_domain::ports::{ChunkingOptions, ChunkingResult, CodeChunker};

use language::{FallbackChunker, RustChunker};

/// Routes a file to `RustChunker` when its extension is `.rs`, otherwise
/// to `FallbackChunker`. Falls back to whole-file chunking when the
/// language-aware pass runs but produces nothing (e.g. a syntactically
/// unparseable `.rs` file).
#[derive(Default)]
pub struct IntelligentChunker {
    rust: RustChunker,
    fallback: FallbackChunker,
}

impl IntelligentChunker {
    /// Build a chunker with the default language-aware/fallback pairing.
    pub fn new() -> Self {
        Self { rust: RustChunker::new(), fallback: FallbackChunker::new() }
    }
}

#[async_trait]
impl CodeChunker for IntelligentChunker {
    async fn chunk_file(
        &self,
        relative_path: &str,
        content: &str,
        options: &ChunkingOptions,
    ) -> Result<ChunkingResult> {
        let is_rust = relative_path.ends_with(".rs");

        if is_rust {
            match self.rust.chunk_file(relative_path, content, options).await {
                Ok(result) if !result.documents.is_empty() => return Ok(result),
                Ok(_) if !options.fallback_to_whole_file => {
                    return Ok(ChunkingResult { documents: Vec::new(), used_language_parser: true });
                }
                Ok(_) | Err(_) => {}
            }
        }

        self.fallback.chunk_file(relative_path, content, options).await
    }

    fn supported_extensions(&self) -> &[&str] {
        &["rs"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rust_files_use_the_language_aware_chunker() {
        let chunker = IntelligentChunker::new();
        let options = ChunkingOptions { repository: "repo".to_string(), ..Default::default() };
        let result = chunker.chunk_file("src/lib.rs", "fn main() {}", &options).await.unwrap();
        assert!(result.used_language_parser);
        assert_eq!(result.documents.len(), 1);
    }

    #[tokio::test]
    async fn non_rust_files_use_the_fallback() {
        let chunker = IntelligentChunker::new();
        let options = ChunkingOptions { repository: "repo".to_string(), ..Default::default() };
        let result = chunker.chunk_file("script.py", "print(1)", &options).await.unwrap();
        assert!(!result.used_language_parser);
        assert_eq!(result.documents.len(), 1);
    }

    #[tokio::test]
    async fn unparseable_rust_falls_back_to_whole_file() {
        let chunker = IntelligentChunker::new();
        let options = ChunkingOptions { repository: "repo".to_string(), ..Default::default() };
        // No top-level items tree-sitter recognizes as chunk nodes, but the
        // file still has content, so the fallback kicks in.
        let result = chunker.chunk_file("src/consts.rs", "const X: i32 = 1;", &options).await.unwrap();
        assert_eq!(result.documents.len(), 1);
    }
}
