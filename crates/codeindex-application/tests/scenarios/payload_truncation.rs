//! Scenario: an oversized source file is ingested as one truncated,
//! still-retrievable document.

use std::sync::Arc;

use codeindex_application::automation::cli::CliAutomation;
use codeindex_providers::chunking::language::FallbackChunker;
use codeindex_providers::search::SearchOperations;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::support::FakeRestClient;

#[tokio::test]
async fn an_oversized_file_is_ingested_as_one_truncated_retrievable_document() {
    let cancel = CancellationToken::new();
    let client = Arc::new(FakeRestClient::new());
    let search_ops = Arc::new(SearchOperations::new(client.clone()));
    search_ops.create_index(&json!({ "name": "code-index", "fields": [] }), &cancel).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let oversized = "x".repeat(2 * 1024 * 1024);
    tokio::fs::write(dir.path().join("huge.txt"), &oversized).await.unwrap();

    let automation = CliAutomation::new(search_ops.clone(), FallbackChunker::new(), None);
    let stats = automation.ingest_repository("demo", dir.path(), "code-index", &cancel).await.unwrap();

    assert_eq!(stats.succeeded, 1);
    assert_eq!(client.document_count("code-index"), 1);

    let response = search_ops.search("code-index", &json!({ "search": "*" }), &cancel).await.unwrap();
    let docs = response["value"].as_array().unwrap();
    assert_eq!(docs.len(), 1);
    let content = docs[0]["content"].as_str().unwrap();
    assert!(docs[0]["truncated"].as_bool().unwrap());
    assert!(content.len() <= 900_000);
}
