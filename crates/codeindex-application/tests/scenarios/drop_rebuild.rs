//! Scenario: drop-rebuild preserves the field set of a backed-up schema.

use std::sync::Arc;

use codeindex_application::automation::reindex::{ReindexAutomation, ReindexMethod};
use codeindex_domain::value_objects::{Field, FieldType, IndexSchema};
use codeindex_providers::chunking::IntelligentChunker;
use codeindex_providers::search::SearchOperations;
use tokio_util::sync::CancellationToken;

use crate::support::FakeRestClient;

fn searchable_field(name: &str) -> Field {
    Field {
        name: name.to_string(),
        field_type: FieldType::String,
        key: false,
        searchable: true,
        filterable: false,
        sortable: false,
        facetable: false,
        retrievable: true,
        dimensions: None,
        vector_search_profile: None,
        analyzer: None,
    }
}

fn filterable_field(name: &str) -> Field {
    Field { filterable: true, ..searchable_field(name) }
}

fn vector_field(name: &str, dimensions: usize) -> Field {
    Field {
        field_type: FieldType::SingleCollection,
        dimensions: Some(dimensions),
        vector_search_profile: Some("vector-profile".to_string()),
        ..searchable_field(name)
    }
}

fn four_field_schema() -> IndexSchema {
    IndexSchema {
        name: "code-index".to_string(),
        fields: vec![
            Field::key_field("id"),
            searchable_field("content"),
            vector_field("content_vector", 1536),
            filterable_field("repository"),
        ],
        vector_search: None,
        semantic: None,
        scoring_profiles: Vec::new(),
        suggesters: Vec::new(),
        cors_options: None,
    }
}

#[tokio::test]
async fn drop_rebuild_preserves_the_original_field_set_and_vector_dimensions() {
    let cancel = CancellationToken::new();
    let client = Arc::new(FakeRestClient::new());
    let search_ops = Arc::new(SearchOperations::new(Arc::clone(&client)));
    let reindex = ReindexAutomation::new(Arc::clone(&search_ops), 1536);

    let schema = four_field_schema();
    search_ops.create_index(&serde_json::to_value(&schema).unwrap(), &cancel).await.unwrap();

    let backup_path = std::env::temp_dir().join(format!("codeindex-scenario1-{}.json", std::process::id()));
    reindex.backup_and_restore("code-index", &backup_path, false, &cancel).await.unwrap();

    let raw = tokio::fs::read_to_string(&backup_path).await.unwrap();
    let mut backed_up: serde_json::Value = serde_json::from_str(&raw).unwrap();
    if let Some(object) = backed_up.as_object_mut() {
        object.remove("_backup_metadata");
    }
    let resolved: IndexSchema = serde_json::from_value(backed_up).unwrap();
    tokio::fs::remove_file(&backup_path).await.ok();

    let report = reindex
        .perform_reindex(
            "code-index",
            ReindexMethod::DropRebuild { schema: Some(&resolved) },
            None::<&IntelligentChunker>,
            false,
            &cancel,
        )
        .await
        .unwrap();
    assert_eq!(report.count, 4);

    let recreated = search_ops.get_index("code-index", &cancel).await.unwrap();
    let names: Vec<&str> = recreated["fields"].as_array().unwrap().iter().map(|f| f["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["id", "content", "content_vector", "repository"]);

    let content_vector = recreated["fields"].as_array().unwrap().iter().find(|f| f["name"] == "content_vector").unwrap();
    assert_eq!(content_vector["dimensions"], 1536);
}
