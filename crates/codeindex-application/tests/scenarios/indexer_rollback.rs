//! Scenario: a failure in `create_indexer` rolls back the datasource and
//! skillset already created in the same pipeline call.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use codeindex_application::automation::indexer::IndexerAutomation;
use codeindex_providers::search::SearchOperations;
use tokio_util::sync::CancellationToken;

use crate::support::FakeRestClient;

#[tokio::test]
async fn a_failed_indexer_creation_rolls_back_the_datasource_and_skillset() {
    let client = Arc::new(FakeRestClient::new());
    client.fail_indexer_creation.store(true, Ordering::SeqCst);
    let search_ops = Arc::new(SearchOperations::new(Arc::clone(&client)));
    let indexer_automation = IndexerAutomation::new(search_ops);

    let skillset = serde_json::json!({ "name": "blob-skillset", "skills": [] });
    let result = indexer_automation
        .create_blob_indexer_pipeline(
            "blob",
            "code-index",
            "conn-string",
            "container",
            1,
            Some(&skillset),
            &CancellationToken::new(),
        )
        .await;

    assert!(result.is_err());
    assert!(!client.has_datasource("blob-datasource"));
    assert!(!client.has_skillset("blob-skillset"));
    assert!(!client.has_indexer("blob-indexer"));
}
