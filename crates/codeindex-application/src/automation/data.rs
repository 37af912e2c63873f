//! Bulk document lifecycle operations: upload, cleanup, reindex between
//! indexes, sampled verification, and export.

use std::sync::Arc;
use std::time::Instant;

use codeindex_domain::constants::{MAX_BATCH_PAYLOAD_BYTES, MAX_BATCH_SIZE};
use codeindex_domain::error::Result;
use codeindex_domain::ports::RestClient;
use codeindex_domain::value_objects::Document;
use codeindex_providers::search::SearchOperations;
use tokio_util::sync::CancellationToken;

/// Maximum number of individual failures kept for logging/reporting.
const MAX_FAILED_DOCUMENTS_LOGGED: usize = 100;

/// Outcome of `DataAutomation::bulk_upload`.
#[derive(Debug, Clone, Default)]
pub struct BulkUploadStats {
    /// Total documents offered to the upload.
    pub total_processed: usize,
    /// Documents the service accepted.
    pub succeeded: usize,
    /// Documents the service rejected.
    pub failed: usize,
    /// Wall-clock duration of the whole upload.
    pub elapsed_seconds: f64,
    /// `succeeded / elapsed_seconds`, `0.0` if instantaneous.
    pub documents_per_second: f64,
    /// The first `MAX_FAILED_DOCUMENTS_LOGGED` failed document ids with a reason.
    pub failed_documents: Vec<(String, String)>,
}

/// Outcome of `DataAutomation::verify_documents`.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    /// Number of documents actually sampled.
    pub sampled: usize,
    /// Per-field count of documents missing the field or with a
    /// null/empty value, keyed by field name.
    pub missing_or_empty: Vec<(String, usize)>,
}

/// Bulk upload, cleanup, cross-index reindex, and export operations over
/// one managed-service index.
pub struct DataAutomation<C: RestClient> {
    search_ops: Arc<SearchOperations<C>>,
}

impl<C: RestClient> DataAutomation<C> {
    /// Build a `DataAutomation` over `search_ops`.
    pub fn new(search_ops: Arc<SearchOperations<C>>) -> Self {
        Self { search_ops }
    }

    /// Upload `documents` to `index_name` in size-bounded batches,
    /// merging if `merge` is set, otherwise uploading.
    ///
    /// Splits a batch further whenever its serialized size would exceed
    /// `MAX_BATCH_PAYLOAD_BYTES`, even if it has not yet reached
    /// `MAX_BATCH_SIZE` documents.
    pub async fn bulk_upload(
        &self,
        index_name: &str,
        documents: &[Document],
        merge: bool,
        cancel: &CancellationToken,
    ) -> Result<BulkUploadStats> {
        let start = Instant::now();
        let mut stats = BulkUploadStats { total_processed: documents.len(), ..Default::default() };

        for batch in size_bounded_batches(documents) {
            let values: Vec<serde_json::Value> =
                batch.iter().filter_map(|d| serde_json::to_value(d).ok()).collect();
            match self.search_ops.upload_documents(index_name, &values, merge, cancel).await {
                Ok(response) => {
                    let (succeeded, failures) = count_upload_outcomes(&response);
                    stats.succeeded += succeeded;
                    stats.failed += failures.len();
                    for failure in failures {
                        if stats.failed_documents.len() < MAX_FAILED_DOCUMENTS_LOGGED {
                            stats.failed_documents.push(failure);
                        }
                    }
                }
                Err(e) => {
                    stats.failed += batch.len();
                    for document in batch {
                        if stats.failed_documents.len() < MAX_FAILED_DOCUMENTS_LOGGED {
                            stats.failed_documents.push((document.id.clone(), e.to_string()));
                        }
                    }
                }
            }
        }

        stats.elapsed_seconds = start.elapsed().as_secs_f64();
        stats.documents_per_second =
            if stats.elapsed_seconds > 0.0 { stats.succeeded as f64 / stats.elapsed_seconds } else { 0.0 };
        Ok(stats)
    }

    /// Delete documents in `index_name` older than `days_old` according
    /// to `date_field`. With `dry_run`, only counts matching documents.
    pub async fn cleanup_old_documents(
        &self,
        index_name: &str,
        date_field: &str,
        days_old: i64,
        dry_run: bool,
        cancel: &CancellationToken,
    ) -> Result<usize> {
        let cutoff = chrono::Utc::now() - chrono::Duration::days(days_old);
        let filter = format!("{date_field} lt {}", cutoff.to_rfc3339());

        let mut removed = 0usize;
        loop {
            let body = serde_json::json!({
                "search": "*",
                "filter": filter,
                "select": "id",
                "top": MAX_BATCH_SIZE,
            });
            let page = self.search_ops.search(index_name, &body, cancel).await?;
            let ids = document_ids(&page);
            if ids.is_empty() {
                break;
            }
            let page_len = ids.len();
            if dry_run {
                removed += page_len;
            } else {
                self.search_ops.delete_documents(index_name, &ids, cancel).await?;
                removed += page_len;
            }
            if page_len < MAX_BATCH_SIZE {
                break;
            }
        }
        Ok(removed)
    }

    /// Copy documents from `source` to `target`, optionally transforming
    /// each page and restricting with `filter`. Stops once a page returns
    /// fewer than `MAX_BATCH_SIZE` documents.
    pub async fn reindex_documents<F>(
        &self,
        source: &str,
        target: &str,
        filter: Option<&str>,
        mut transform: Option<F>,
        cancel: &CancellationToken,
    ) -> Result<usize>
    where
        F: FnMut(Document) -> Document,
    {
        let mut copied = 0usize;
        let mut skip = 0usize;
        loop {
            let mut body = serde_json::json!({ "search": "*", "top": MAX_BATCH_SIZE, "skip": skip });
            if let Some(f) = filter {
                body["filter"] = serde_json::Value::String(f.to_string());
            }
            let page = self.search_ops.search(source, &body, cancel).await?;
            let mut documents = documents_from_search_response(&page);
            let page_len = documents.len();
            if page_len == 0 {
                break;
            }
            if let Some(f) = transform.as_mut() {
                documents = documents.into_iter().map(|d| f(d)).collect();
            }
            let values: Vec<serde_json::Value> =
                documents.iter().filter_map(|d| serde_json::to_value(d).ok()).collect();
            self.search_ops.upload_documents(target, &values, true, cancel).await?;
            copied += page_len;
            skip += page_len;
            if page_len < MAX_BATCH_SIZE {
                break;
            }
        }
        Ok(copied)
    }

    /// Sample up to `sample_size` documents and report, per field in
    /// `check_fields`, how many sampled documents have it missing or empty.
    pub async fn verify_documents(
        &self,
        index_name: &str,
        sample_size: usize,
        check_fields: &[&str],
        cancel: &CancellationToken,
    ) -> Result<VerificationReport> {
        let body = serde_json::json!({ "search": "*", "top": sample_size });
        let response = self.search_ops.search(index_name, &body, cancel).await?;
        let rows = response["value"].as_array().cloned().unwrap_or_default();

        let mut missing_or_empty = Vec::new();
        for field in check_fields {
            let count = rows
                .iter()
                .filter(|row| match row.get(*field) {
                    None | Some(serde_json::Value::Null) => true,
                    Some(serde_json::Value::String(s)) => s.is_empty(),
                    Some(serde_json::Value::Array(a)) => a.is_empty(),
                    _ => false,
                })
                .count();
            missing_or_empty.push(((*field).to_string(), count));
        }

        Ok(VerificationReport { sampled: rows.len(), missing_or_empty })
    }

    /// Materialize every document in `index_name` matching `filter`,
    /// restricted to `select` fields if given, paginating with a small
    /// delay between pages.
    pub async fn export_documents(
        &self,
        index_name: &str,
        filter: Option<&str>,
        select: Option<&[&str]>,
        cancel: &CancellationToken,
    ) -> Result<Vec<serde_json::Value>> {
        let mut out = Vec::new();
        let mut skip = 0usize;
        loop {
            let mut body = serde_json::json!({ "search": "*", "top": MAX_BATCH_SIZE, "skip": skip });
            if let Some(f) = filter {
                body["filter"] = serde_json::Value::String(f.to_string());
            }
            if let Some(fields) = select {
                body["select"] = serde_json::Value::String(fields.join(","));
            }
            let page = self.search_ops.search(index_name, &body, cancel).await?;
            let rows = page["value"].as_array().cloned().unwrap_or_default();
            let page_len = rows.len();
            out.extend(rows);
            skip += page_len;
            if page_len < MAX_BATCH_SIZE {
                break;
            }
            tokio::select! {
                () = tokio::time::sleep(std::time::Duration::from_millis(20)) => {}
                () = cancel.cancelled() => {
                    return Err(codeindex_domain::error::Error::request("document export cancelled"));
                }
            }
        }
        Ok(out)
    }
}

/// Split `documents` into batches no larger than `MAX_BATCH_SIZE` items
/// and no larger than `MAX_BATCH_PAYLOAD_BYTES` serialized.
fn size_bounded_batches(documents: &[Document]) -> Vec<&[Document]> {
    let mut batches = Vec::new();
    let mut start = 0usize;
    let mut batch_bytes = 0usize;

    for (i, document) in documents.iter().enumerate() {
        let size = serde_json::to_vec(document).map(|v| v.len()).unwrap_or(0);
        let would_overflow_bytes = batch_bytes + size > MAX_BATCH_PAYLOAD_BYTES && i > start;
        let would_overflow_count = i - start >= MAX_BATCH_SIZE;
        if would_overflow_bytes || would_overflow_count {
            batches.push(&documents[start..i]);
            start = i;
            batch_bytes = 0;
        }
        batch_bytes += size;
    }
    if start < documents.len() {
        batches.push(&documents[start..]);
    }
    batches
}

fn count_upload_outcomes(response: &serde_json::Value) -> (usize, Vec<(String, String)>) {
    let mut succeeded = 0usize;
    let mut failures = Vec::new();
    if let Some(results) = response["value"].as_array() {
        for result in results {
            let key = result["key"].as_str().unwrap_or_default().to_string();
            let status = result["status"].as_bool().unwrap_or(false);
            if status {
                succeeded += 1;
            } else {
                let reason = result["errorMessage"].as_str().unwrap_or("unknown error").to_string();
                failures.push((key, reason));
            }
        }
    }
    (succeeded, failures)
}

fn document_ids(response: &serde_json::Value) -> Vec<String> {
    response["value"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|row| row["id"].as_str().map(str::to_string))
        .collect()
}

fn documents_from_search_response(response: &serde_json::Value) -> Vec<Document> {
    response["value"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|row| serde_json::from_value(row.clone()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc(id: &str) -> Document {
        Document {
            id: id.to_string(),
            content: "x".repeat(10),
            repository: "repo".to_string(),
            file_path: "a.rs".to_string(),
            file_extension: "rs".to_string(),
            language: "rust".to_string(),
            chunk_type: codeindex_domain::value_objects::ChunkType::File,
            chunk_id: format!("a.rs:{id}"),
            start_line: 1,
            end_line: 1,
            function_name: None,
            class_name: None,
            signature: None,
            docstring: None,
            imports: Vec::new(),
            dependencies: Vec::new(),
            last_modified: chrono::Utc::now(),
            content_vector: None,
            truncated: false,
        }
    }

    #[test]
    fn batches_split_on_document_count() {
        let documents: Vec<Document> = (0..(MAX_BATCH_SIZE + 10)).map(|i| sample_doc(&i.to_string())).collect();
        let batches = size_bounded_batches(&documents);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), MAX_BATCH_SIZE);
    }

    #[test]
    fn a_single_small_document_is_one_batch() {
        let documents = vec![sample_doc("1")];
        let batches = size_bounded_batches(&documents);
        assert_eq!(batches.len(), 1);
    }

    #[test]
    fn batches_split_on_payload_size_well_under_the_document_count_cap() {
        let mut documents: Vec<Document> = (0..8).map(|i| sample_doc(&i.to_string())).collect();
        for document in &mut documents {
            document.content = "x".repeat(150_000);
        }
        let batches = size_bounded_batches(&documents);
        assert!(batches.len() > 1, "8 documents of ~150KB each exceed MAX_BATCH_PAYLOAD_BYTES and must split");
        for batch in &batches {
            let batch_bytes: usize = batch.iter().filter_map(|d| serde_json::to_vec(d).ok()).map(|v| v.len()).sum();
            assert!(batch_bytes <= MAX_BATCH_PAYLOAD_BYTES);
        }
    }

    #[test]
    fn upload_outcomes_separate_successes_from_failures() {
        let response = serde_json::json!({
            "value": [
                {"key": "a", "status": true},
                {"key": "b", "status": false, "errorMessage": "conflict"},
            ]
        });
        let (succeeded, failures) = count_upload_outcomes(&response);
        assert_eq!(succeeded, 1);
        assert_eq!(failures, vec![("b".to_string(), "conflict".to_string())]);
    }
}
