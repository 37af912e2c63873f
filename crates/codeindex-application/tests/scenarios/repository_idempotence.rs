//! Scenario: reindexing an unchanged repository twice back-to-back
//! produces the same succeeded count and the same document count.

use std::sync::Arc;

use codeindex_application::automation::cli::CliAutomation;
use codeindex_providers::chunking::IntelligentChunker;
use codeindex_providers::search::SearchOperations;
use tokio_util::sync::CancellationToken;

use crate::support::FakeRestClient;

async fn write_sample_repo(dir: &std::path::Path) {
    for i in 0..12 {
        let contents = format!("fn f{i}() -> i32 {{ {i} }}\n");
        tokio::fs::write(dir.join(format!("mod_{i}.rs")), contents).await.unwrap();
    }
}

#[tokio::test]
async fn repository_reindex_is_idempotent_across_two_runs() {
    let cancel = CancellationToken::new();
    let client = Arc::new(FakeRestClient::new());
    let search_ops = Arc::new(SearchOperations::new(Arc::clone(&client)));
    search_ops.create_index(&serde_json::json!({ "name": "code-index", "fields": [] }), &cancel).await.unwrap();

    let repo_dir = tempfile::tempdir().unwrap();
    write_sample_repo(repo_dir.path()).await;

    let ingest = CliAutomation::new(Arc::clone(&search_ops), IntelligentChunker::new(), None);

    let first = ingest.ingest_repository("sample-repo", repo_dir.path(), "code-index", &cancel).await.unwrap();
    let first_count = search_ops.count_documents("code-index", &cancel).await.unwrap();

    let second = ingest.ingest_repository("sample-repo", repo_dir.path(), "code-index", &cancel).await.unwrap();
    let second_count = search_ops.count_documents("code-index", &cancel).await.unwrap();

    assert_eq!(first.succeeded, second.succeeded);
    assert_eq!(first_count, second_count);
    assert_eq!(first_count, 12);
}
