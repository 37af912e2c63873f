//! Full-stack smoke test: `App::init` wired over a real pooled
//! `reqwest` client talking to a mock HTTP server, proving the
//! composition root's rate-limited transport, `SearchOperations`, and
//! automation façade compose correctly outside unit tests.

use codeindex::infrastructure::config::Config;
use codeindex::App;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(endpoint: &str) -> Config {
    Config { endpoint: endpoint.to_string(), api_key: "test-key".to_string(), ..Config::default() }
}

#[tokio::test]
async fn app_init_reports_a_missing_index_as_a_hard_health_issue() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/indexes/code-index")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

    let app = App::init(config_for(&server.uri())).unwrap();
    let health =
        app.automation.reindex.get_index_health(&app.config.index_name, &CancellationToken::new()).await.unwrap();

    assert_eq!(health.document_count, 0);
    assert!(health.issues.iter().any(|issue| issue.kind == "missing_index"));

    app.cleanup();
}

#[tokio::test]
async fn app_init_reports_stats_for_an_existing_index() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indexes/code-index"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "code-index",
            "fields": [{"name": "id", "type": "string", "key": true}],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/indexes/code-index/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "documentCount": 42,
            "storageSize": 1024,
        })))
        .mount(&server)
        .await;

    let app = App::init(config_for(&server.uri())).unwrap();
    let health =
        app.automation.reindex.get_index_health(&app.config.index_name, &CancellationToken::new()).await.unwrap();

    assert_eq!(health.document_count, 42);
    assert!(health.issues.is_empty());

    app.cleanup();
}
