//! Whole-file chunker used for every extension with no language-aware
//! processor, per the explicit Non-goal scoping AST analysis to one
//! primary language.

use async_trait::async_trait;
use codeindex_domain::error::Result;
use codeindex_domain::ports::{ChunkingOptions, ChunkingResult, CodeChunker};
use codeindex_domain::value_objects::{ChunkType, Document};

/// Produces exactly one `Document` per file, covering the whole content.
#[derive(Default)]
pub struct FallbackChunker;

impl FallbackChunker {
    /// Build a fallback chunker.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CodeChunker for FallbackChunker {
    async fn chunk_file(
        &self,
        relative_path: &str,
        content: &str,
        options: &ChunkingOptions,
    ) -> Result<ChunkingResult> {
        if content.is_empty() {
            return Ok(ChunkingResult { documents: Vec::new(), used_language_parser: false });
        }

        let extension =
            relative_path.rsplit('.').next().filter(|ext| *ext != relative_path).unwrap_or("").to_string();
        let language = language_for_extension(&extension);
        let total_lines = u32::try_from(content.lines().count().max(1)).unwrap_or(u32::MAX);

        let id = Document::derive_id(&options.repository, relative_path, 0);
        let mut document = Document {
            id,
            content: content.to_string(),
            repository: options.repository.clone(),
            file_path: relative_path.to_string(),
            file_extension: extension,
            language,
            chunk_type: ChunkType::File,
            chunk_id: format!("{relative_path}:0"),
            start_line: 1,
            end_line: total_lines,
            function_name: None,
            class_name: None,
            signature: None,
            docstring: None,
            imports: Vec::new(),
            dependencies: Vec::new(),
            last_modified: chrono::Utc::now(),
            content_vector: None,
            truncated: false,
        };
        document.enforce_char_budget(options.max_chunk_chars);
        document.enforce_size_budget();

        Ok(ChunkingResult { documents: vec![document], used_language_parser: false })
    }

    fn supported_extensions(&self) -> &[&str] {
        &[]
    }
}

/// Best-effort language tag from a file extension; `"plaintext"` when
/// unrecognized.
fn language_for_extension(extension: &str) -> String {
    match extension {
        "py" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "hpp" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "kt" => "kotlin",
        "" => "plaintext",
        other => other,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn whole_file_becomes_one_document() {
        let chunker = FallbackChunker::new();
        let options = ChunkingOptions { repository: "repo".to_string(), ..Default::default() };
        let result = chunker.chunk_file("scripts/deploy.py", "print('hi')\n", &options).await.unwrap();
        assert_eq!(result.documents.len(), 1);
        assert!(!result.used_language_parser);
        assert_eq!(result.documents[0].language, "python");
        assert_eq!(result.documents[0].chunk_type, ChunkType::File);
    }

    #[tokio::test]
    async fn a_file_over_the_char_cap_is_truncated_independently_of_byte_size() {
        let chunker = FallbackChunker::new();
        let options = ChunkingOptions { repository: "repo".to_string(), ..Default::default() };
        let content = "x".repeat(40_000);
        assert!(content.len() < 1024 * 1024);

        let result = chunker.chunk_file("notes.txt", &content, &options).await.unwrap();
        assert_eq!(result.documents.len(), 1);
        let doc = &result.documents[0];
        assert!(doc.truncated);
        assert!(doc.content.chars().count() <= codeindex_domain::value_objects::MAX_CONTENT_CHARS);
    }

    #[tokio::test]
    async fn empty_file_produces_no_documents() {
        let chunker = FallbackChunker::new();
        let options = ChunkingOptions { repository: "repo".to_string(), ..Default::default() };
        let result = chunker.chunk_file("empty.txt", "", &options).await.unwrap();
        assert!(result.documents.is_empty());
    }
}
