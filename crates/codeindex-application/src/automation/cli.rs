//! Repository ingestion orchestrator used by tooling: walks a repository,
//! chunks each file, embeds each chunk, and bulk-uploads the result.
//!
//! Not a command-line front end itself — the CLI front end is an
//! explicit collaborator left out of scope.

use std::path::Path;
use std::sync::Arc;

use codeindex_domain::error::Result;
use codeindex_domain::ports::{ChunkingOptions, CodeChunker, EmbeddingProvider, RestClient};
use codeindex_domain::value_objects::Document;
use codeindex_providers::search::SearchOperations;
use tokio_util::sync::CancellationToken;

use crate::automation::data::{BulkUploadStats, DataAutomation};

/// Directories never walked, regardless of ignore files.
pub const SKIP_DIRS: &[&str] = &[".git", "node_modules", "target", "__pycache__", "venv", ".venv"];

/// Walks `repo_path`, chunks every file a `CodeChunker` recognizes or
/// falls back on, embeds each produced document, and bulk-uploads the
/// result to `index_name`.
pub struct CliAutomation<C: RestClient, Chunker: CodeChunker> {
    data: DataAutomation<C>,
    chunker: Chunker,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl<C: RestClient, Chunker: CodeChunker> CliAutomation<C, Chunker> {
    /// Build a `CliAutomation`. `embedder` is optional: when absent,
    /// documents are uploaded without `content_vector`.
    pub fn new(search_ops: Arc<SearchOperations<C>>, chunker: Chunker, embedder: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        Self { data: DataAutomation::new(search_ops), chunker, embedder }
    }

    /// Ingest `repo_path` into `index_name` under `repository`'s name.
    pub async fn ingest_repository(
        &self,
        repository: &str,
        repo_path: &Path,
        index_name: &str,
        cancel: &CancellationToken,
    ) -> Result<BulkUploadStats> {
        let documents = self.discover_and_chunk(repository, repo_path).await?;
        let documents = self.embed(documents).await;
        self.data.bulk_upload(index_name, &documents, true, cancel).await
    }

    async fn discover_and_chunk(&self, repository: &str, repo_path: &Path) -> Result<Vec<Document>> {
        let options = ChunkingOptions { repository: repository.to_string(), ..Default::default() };
        let mut documents = Vec::new();

        let walker = ignore::WalkBuilder::new(repo_path)
            .hidden(false)
            .filter_entry(|entry| {
                if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    return true;
                }
                entry.file_name().to_str().is_none_or(|name| !SKIP_DIRS.contains(&name))
            })
            .build();

        for entry in walker {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let relative = entry.path().strip_prefix(repo_path).unwrap_or(entry.path()).to_string_lossy().replace('\\', "/");
            let Ok(content) = tokio::fs::read_to_string(entry.path()).await else { continue };
            let result = self.chunker.chunk_file(&relative, &content, &options).await?;
            documents.extend(result.documents);
        }

        Ok(documents)
    }

    async fn embed(&self, mut documents: Vec<Document>) -> Vec<Document> {
        let Some(embedder) = &self.embedder else { return documents };

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        match embedder.embed_batch(&texts).await {
            Ok(embeddings) => {
                for (document, embedding) in documents.iter_mut().zip(embeddings) {
                    document.content_vector = Some(embedding.vector);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "embedding batch failed; uploading without vectors");
            }
        }
        documents
    }
}
