//! Drop-rebuild, clear-by-filter, repository reindex, schema
//! validate/backup/restore, and reindex-need analysis.

use std::path::Path;
use std::sync::Arc;

use codeindex_domain::constants::INDEX_SIZE_OPTIMIZATION_THRESHOLD_BYTES;
use codeindex_domain::error::{Error, Result};
use codeindex_domain::ports::{ChunkingOptions, CodeChunker, RestClient};
use codeindex_domain::value_objects::IndexSchema;
use codeindex_providers::search::SearchOperations;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::automation::data::DataAutomation;

/// Issue or warning severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Blocks correct operation; action required.
    Hard,
    /// Worth attention but not immediately blocking.
    Soft,
}

/// One health finding.
#[derive(Debug, Clone)]
pub struct HealthIssue {
    /// Short machine-readable category.
    pub kind: String,
    /// Human-readable description.
    pub message: String,
    /// Whether this is a hard issue or a soft warning.
    pub severity: Severity,
}

/// Result of `ReindexAutomation::get_index_health`.
#[derive(Debug, Clone, Default)]
pub struct IndexHealth {
    /// Document count, from the service's index stats.
    pub document_count: u64,
    /// Storage size in bytes, from the service's index stats.
    pub storage_size_bytes: u64,
    /// Hard issues found.
    pub issues: Vec<HealthIssue>,
    /// Soft warnings found.
    pub warnings: Vec<HealthIssue>,
}

/// Chosen reindex strategy for `ReindexAutomation::perform_reindex`.
pub enum ReindexMethod<'a> {
    /// Delete the index and recreate it from a saved or fetched schema.
    DropRebuild {
        /// Schema to recreate from; if omitted, the currently fetched
        /// schema (stripped of service metadata) is used.
        schema: Option<&'a IndexSchema>,
    },
    /// Paginate `select=id` with `filter` and delete in batches.
    Clear {
        /// OData filter restricting which documents to delete.
        filter: &'a str,
    },
    /// Walk `repo_path` with a `CodeChunker` and bulk-upload; clears
    /// first if `clear_filter` is given.
    Repository {
        /// Repository name stamped onto produced documents.
        repository: &'a str,
        /// Local path to walk.
        repo_path: &'a Path,
        /// Optional filter to clear before walking.
        clear_filter: Option<&'a str>,
    },
}

/// Outcome of `ReindexAutomation::perform_reindex`.
#[derive(Debug, Clone, Default)]
pub struct ReindexReport {
    /// Human-readable description of the action taken (or that would be
    /// taken, for `dry_run`).
    pub action: String,
    /// Documents affected (deleted for `clear`, uploaded for `repository`).
    pub count: usize,
    /// `true` if no side effects were actually performed.
    pub dry_run: bool,
}

/// Drop-rebuild, clear, and repository-reindex operations, plus schema
/// backup/restore and reindex-need analysis, over one managed-service
/// index.
pub struct ReindexAutomation<C: RestClient> {
    search_ops: Arc<SearchOperations<C>>,
    data: DataAutomation<C>,
    expected_vector_dimensions: usize,
}

impl<C: RestClient> ReindexAutomation<C> {
    /// Build a `ReindexAutomation` over `search_ops`, validating vector
    /// fields against `expected_vector_dimensions`.
    pub fn new(search_ops: Arc<SearchOperations<C>>, expected_vector_dimensions: usize) -> Self {
        let data = DataAutomation::new(Arc::clone(&search_ops));
        Self { search_ops, data, expected_vector_dimensions }
    }

    /// Compose schema presence, field coverage, vector dimensions, and
    /// stats into a health report.
    pub async fn get_index_health(&self, index_name: &str, cancel: &CancellationToken) -> Result<IndexHealth> {
        let mut health = IndexHealth::default();

        let schema = match self.search_ops.get_index(index_name, cancel).await {
            Ok(schema) => schema,
            Err(Error::HttpStatus { status: 404, .. }) => {
                health.issues.push(HealthIssue {
                    kind: "missing_index".to_string(),
                    message: format!("index {index_name} does not exist"),
                    severity: Severity::Hard,
                });
                return Ok(health);
            }
            Err(e) => return Err(e),
        };

        if schema["fields"].as_array().is_none_or(Vec::is_empty) {
            health.issues.push(HealthIssue {
                kind: "no_fields".to_string(),
                message: "schema has no fields".to_string(),
                severity: Severity::Hard,
            });
        }

        if let Some(fields) = schema["fields"].as_array() {
            for field in fields {
                if let Some(dimensions) = field["dimensions"].as_u64() {
                    if dimensions as usize != self.expected_vector_dimensions {
                        health.warnings.push(HealthIssue {
                            kind: "vector_dimension_mismatch".to_string(),
                            message: format!(
                                "field {} has {dimensions} dimensions, expected {}",
                                field["name"].as_str().unwrap_or("?"),
                                self.expected_vector_dimensions
                            ),
                            severity: Severity::Soft,
                        });
                    }
                }
            }
        }

        let stats = self.search_ops.get_index_stats(index_name, cancel).await?;
        health.document_count = stats["documentCount"].as_u64().unwrap_or(0);
        health.storage_size_bytes = stats["storageSize"].as_u64().unwrap_or(0);

        if health.document_count == 0 {
            health.warnings.push(HealthIssue {
                kind: "empty_index".to_string(),
                message: "index has zero documents".to_string(),
                severity: Severity::Soft,
            });
        }

        Ok(health)
    }

    /// Execute (or, with `dry_run`, describe) `method` against `index_name`.
    pub async fn perform_reindex<Chunker: CodeChunker>(
        &self,
        index_name: &str,
        method: ReindexMethod<'_>,
        chunker: Option<&Chunker>,
        dry_run: bool,
        cancel: &CancellationToken,
    ) -> Result<ReindexReport> {
        match method {
            ReindexMethod::DropRebuild { schema } => {
                let resolved = match schema {
                    Some(s) => s.clone(),
                    None => {
                        let raw = self.search_ops.get_index(index_name, cancel).await?;
                        strip_service_metadata(serde_json::from_value(raw)?)
                    }
                };
                if dry_run {
                    return Ok(ReindexReport { action: "drop-rebuild".to_string(), count: 0, dry_run: true });
                }
                self.search_ops.delete_index(index_name, cancel).await?;
                let value = serde_json::to_value(&resolved)?;
                self.search_ops.create_index(&value, cancel).await?;
                Ok(ReindexReport { action: "drop-rebuild".to_string(), count: resolved.fields.len(), dry_run: false })
            }
            ReindexMethod::Clear { filter } => {
                if dry_run {
                    return Ok(ReindexReport { action: format!("clear: {filter}"), count: 0, dry_run: true });
                }
                let count = self.clear_by_filter(index_name, filter, cancel).await?;
                Ok(ReindexReport { action: format!("clear: {filter}"), count, dry_run: false })
            }
            ReindexMethod::Repository { repository, repo_path, clear_filter } => {
                let chunker = chunker.ok_or_else(|| Error::validation("repository reindex requires a chunker"))?;
                if dry_run {
                    return Ok(ReindexReport {
                        action: format!("repository reindex: {repository}"),
                        count: 0,
                        dry_run: true,
                    });
                }
                if let Some(filter) = clear_filter {
                    self.clear_by_filter(index_name, filter, cancel).await?;
                }
                let documents = walk_and_chunk(repository, repo_path, chunker).await?;
                let stats = self.data.bulk_upload(index_name, &documents, true, cancel).await?;
                Ok(ReindexReport {
                    action: format!("repository reindex: {repository}"),
                    count: stats.succeeded,
                    dry_run: false,
                })
            }
        }
    }

    async fn clear_by_filter(&self, index_name: &str, filter: &str, cancel: &CancellationToken) -> Result<usize> {
        let mut removed = 0usize;
        loop {
            let body = json!({ "search": "*", "filter": filter, "select": "id", "top": 1000 });
            let page = self.search_ops.search(index_name, &body, cancel).await?;
            let ids: Vec<String> =
                page["value"].as_array().into_iter().flatten().filter_map(|row| row["id"].as_str().map(str::to_string)).collect();
            if ids.is_empty() {
                break;
            }
            let page_len = ids.len();
            self.search_ops.delete_documents(index_name, &ids, cancel).await?;
            removed += page_len;
            if page_len < 1000 {
                break;
            }
        }
        Ok(removed)
    }

    /// Write the live schema for `index_name` to `path`, with a
    /// `_backup_metadata` header, or restore it from a prior backup.
    pub async fn backup_and_restore(
        &self,
        index_name: &str,
        path: &Path,
        restore: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if restore {
            let contents = tokio::fs::read_to_string(path).await?;
            let mut backup: Value = serde_json::from_str(&contents)?;
            if let Some(object) = backup.as_object_mut() {
                object.remove("_backup_metadata");
            }
            let _ = self.search_ops.delete_index(index_name, cancel).await;
            self.search_ops.create_index(&backup, cancel).await?;
            Ok(())
        } else {
            let mut schema = self.search_ops.get_index(index_name, cancel).await?;
            let document_count = self.search_ops.count_documents(index_name, cancel).await.ok();
            if let Some(object) = schema.as_object_mut() {
                object.insert(
                    "_backup_metadata".to_string(),
                    json!({
                        "timestamp": chrono::Utc::now().to_rfc3339(),
                        "index_name": index_name,
                        "document_count": document_count,
                    }),
                );
            }

            let tmp_path = path.with_extension("json.tmp");
            let serialized = serde_json::to_string_pretty(&schema)?;
            tokio::fs::write(&tmp_path, serialized).await?;
            tokio::fs::rename(&tmp_path, path).await?;
            Ok(())
        }
    }

    /// Compose schema validity, warnings, emptiness, and size checks into
    /// a priority-ordered list of recommended actions.
    pub async fn analyze_reindex_need(
        &self,
        index_name: &str,
        staleness_threshold_days: i64,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        let health = self.get_index_health(index_name, cancel).await?;
        let mut recommendations = Vec::new();

        for issue in &health.issues {
            recommendations.push(format!("[hard] {}", issue.message));
        }
        for warning in &health.warnings {
            recommendations.push(format!("[soft] {}", warning.message));
        }
        if health.document_count == 0 {
            recommendations.push("repository reindex recommended: index is empty".to_string());
        }
        if health.storage_size_bytes > INDEX_SIZE_OPTIMIZATION_THRESHOLD_BYTES {
            recommendations.push(format!(
                "index optimization recommended: storage size {} bytes exceeds {} bytes",
                health.storage_size_bytes, INDEX_SIZE_OPTIMIZATION_THRESHOLD_BYTES
            ));
        }

        if health.document_count > 0 {
            let cutoff = chrono::Utc::now() - chrono::Duration::days(staleness_threshold_days);
            let body = json!({
                "search": "*",
                "filter": format!("last_modified lt {}", cutoff.to_rfc3339()),
                "top": 0,
                "includeTotalCount": true,
            });
            match self.search_ops.search(index_name, &body, cancel).await {
                Ok(response) => {
                    let stale_count = response["@odata.count"].as_u64().unwrap_or(0);
                    if stale_count > 0 {
                        recommendations.push(format!(
                            "repository reindex recommended: {stale_count} document(s) older than {staleness_threshold_days} day(s)"
                        ));
                    }
                }
                Err(e) => {
                    recommendations.push(format!("[soft] staleness check failed: {e}"));
                }
            }
        }

        Ok(recommendations)
    }
}

fn strip_service_metadata(mut schema: IndexSchema) -> IndexSchema {
    schema.suggesters.clear();
    schema
}

async fn walk_and_chunk<Chunker: CodeChunker>(
    repository: &str,
    repo_path: &Path,
    chunker: &Chunker,
) -> Result<Vec<codeindex_domain::value_objects::Document>> {
    let mut documents = Vec::new();
    let options = ChunkingOptions { repository: repository.to_string(), ..Default::default() };

    for entry in ignore::WalkBuilder::new(repo_path).hidden(false).build() {
        let entry = entry.map_err(|e| Error::Io { message: e.to_string(), source: None })?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let relative = entry.path().strip_prefix(repo_path).unwrap_or(entry.path()).to_string_lossy().replace('\\', "/");
        let content = match tokio::fs::read_to_string(entry.path()).await {
            Ok(c) => c,
            Err(_) => continue,
        };
        let result = chunker.chunk_file(&relative, &content, &options).await?;
        documents.extend(result.documents);
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_service_metadata_clears_suggesters() {
        let schema = IndexSchema {
            name: "idx".to_string(),
            fields: Vec::new(),
            vector_search: None,
            semantic: None,
            scoring_profiles: Vec::new(),
            suggesters: vec![codeindex_domain::value_objects::Suggester {
                name: "sg".to_string(),
                source_fields: vec!["content".to_string()],
            }],
            cors_options: None,
        };
        let stripped = strip_service_metadata(schema);
        assert!(stripped.suggesters.is_empty());
    }
}
