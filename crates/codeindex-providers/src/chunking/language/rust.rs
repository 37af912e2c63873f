//! Tree-sitter-based chunker for `.rs` files — the one fully AST-capable
//! language chunker, per the explicit Non-goal limiting language-specific
//! analysis to a single primary language.

use codeindex_domain::error::{Error, Result};
use codeindex_domain::ports::{ChunkingOptions, ChunkingResult, CodeChunker};
use codeindex_domain::value_objects::{ChunkType, Document};
use tree_sitter::{Node, Parser};

use async_trait::async_trait;

/// Node kinds treated as top-level, independently indexable chunks.
const CHUNK_NODE_KINDS: [&str; 4] = ["function_item", "impl_item", "struct_item", "enum_item"];

/// Splits Rust source into one chunk per top-level item (function, impl
/// block, struct, enum) using `tree-sitter-rust`.
#[derive(Default)]
pub struct RustChunker;

impl RustChunker {
    /// Build a Rust chunker.
    pub fn new() -> Self {
        Self
    }

    fn parse(content: &str) -> Result<tree_sitter::Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .map_err(|e| Error::internal(format!("failed to load tree-sitter-rust grammar: {e}")))?;
        parser.parse(content, None).ok_or_else(|| Error::internal("tree-sitter failed to parse Rust source"))
    }

    fn node_name(node: Node, content: &str) -> Option<String> {
        node.child_by_field_name("name").and_then(|n| n.utf8_text(content.as_bytes()).ok()).map(str::to_string)
    }

    fn chunk_type_for(kind: &str) -> ChunkType {
        match kind {
            "function_item" => ChunkType::Function,
            "impl_item" | "struct_item" | "enum_item" => ChunkType::Class,
            _ => ChunkType::File,
        }
    }

    fn walk_top_level(
        root: Node,
        content: &str,
        relative_path: &str,
        repository: &str,
        max_chunk_chars: usize,
    ) -> Vec<Document> {
        let mut documents = Vec::new();
        let mut cursor = root.walk();
        let mut chunk_index = 0usize;

        for child in root.children(&mut cursor) {
            if !CHUNK_NODE_KINDS.contains(&child.kind()) {
                continue;
            }
            let Ok(text) = child.utf8_text(content.as_bytes()) else { continue };
            let chunk_type = Self::chunk_type_for(child.kind());
            let name = Self::node_name(child, content);

            let id = Document::derive_id(repository, relative_path, chunk_index);
            let mut document = Document {
                id,
                content: text.to_string(),
                repository: repository.to_string(),
                file_path: relative_path.to_string(),
                file_extension: "rs".to_string(),
                language: "rust".to_string(),
                chunk_type,
                chunk_id: format!("{relative_path}:{chunk_index}"),
                start_line: u32::try_from(child.start_position().row).unwrap_or(0) + 1,
                end_line: u32::try_from(child.end_position().row).unwrap_or(0) + 1,
                function_name: if matches!(child.kind(), "function_item") { name.clone() } else { None },
                class_name: if matches!(child.kind(), "impl_item" | "struct_item" | "enum_item") {
                    name
                } else {
                    None
                },
                signature: None,
                docstring: None,
                imports: Vec::new(),
                dependencies: Vec::new(),
                last_modified: chrono::Utc::now(),
                content_vector: None,
                truncated: false,
            };
            document.enforce_char_budget(max_chunk_chars);
            document.enforce_size_budget();
            documents.push(document);
            chunk_index += 1;
        }

        documents
    }
}

#[async_trait]
impl CodeChunker for RustChunker {
    async fn chunk_file(
        &self,
        relative_path: &str,
        content: &str,
        options: &ChunkingOptions,
    ) -> Result<ChunkingResult> {
        let tree = Self::parse(content)?;
        let documents =
            Self::walk_top_level(tree.root_node(), content, relative_path, &options.repository, options.max_chunk_chars);

        if documents.is_empty() {
            return Ok(ChunkingResult { documents: Vec::new(), used_language_parser: true });
        }
        Ok(ChunkingResult { documents, used_language_parser: true })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["rs"]
    }
}
