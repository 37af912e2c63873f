//! In-memory fake of the managed search service, just stateful enough to
//! drive index/datasource/skillset/indexer CRUD the way end-to-end
//! scenario tests need — no network, no wiremock server.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use codeindex_domain::error::{Error, Result};
use codeindex_domain::ports::{HttpMethod, QueryParam, RestClient};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct State {
    indexes: HashMap<String, Value>,
    datasources: HashMap<String, Value>,
    skillsets: HashMap<String, Value>,
    indexers: HashMap<String, Value>,
    documents: HashMap<String, HashMap<String, Value>>,
}

/// A fake `RestClient` backed by in-memory maps instead of HTTP.
///
/// `fail_indexer_creation` lets a test simulate a mid-pipeline failure
/// (scenario: rollback after datasource/skillset creation).
#[derive(Default)]
pub struct FakeRestClient {
    state: Mutex<State>,
    pub fail_indexer_creation: std::sync::atomic::AtomicBool,
}

impl FakeRestClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document_count(&self, index_name: &str) -> usize {
        self.state.lock().unwrap().documents.get(index_name).map_or(0, HashMap::len)
    }

    pub fn has_datasource(&self, name: &str) -> bool {
        self.state.lock().unwrap().datasources.contains_key(name)
    }

    pub fn has_skillset(&self, name: &str) -> bool {
        self.state.lock().unwrap().skillsets.contains_key(name)
    }

    pub fn has_indexer(&self, name: &str) -> bool {
        self.state.lock().unwrap().indexers.contains_key(name)
    }
}

#[async_trait]
impl RestClient for FakeRestClient {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        _query: &[QueryParam<'_>],
        body: Option<&Value>,
        _cancel: &CancellationToken,
    ) -> Result<Value> {
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        let mut state = self.state.lock().unwrap();

        match (method, segments.as_slice()) {
            (HttpMethod::Put, ["indexes", name]) => {
                let definition = body.cloned().unwrap_or(Value::Null);
                state.indexes.insert((*name).to_string(), definition.clone());
                state.documents.entry((*name).to_string()).or_default();
                Ok(definition)
            }
            (HttpMethod::Get, ["indexes", name]) => state
                .indexes
                .get(*name)
                .cloned()
                .ok_or_else(|| Error::http_status("GET", path, 404)),
            (HttpMethod::Delete, ["indexes", name]) => {
                state.indexes.remove(*name);
                state.documents.remove(*name);
                Ok(Value::Null)
            }
            (HttpMethod::Get, ["indexes", name, "stats"]) => {
                let count = state.documents.get(*name).map_or(0, HashMap::len);
                Ok(json!({ "documentCount": count, "storageSize": 0 }))
            }
            (HttpMethod::Get, ["indexes", name, "docs", "$count"]) => {
                let count = state.documents.get(*name).map_or(0, HashMap::len);
                Ok(json!(count))
            }
            (HttpMethod::Post, ["indexes", name, "docs", "index"]) => {
                let batch = body.and_then(|b| b["value"].as_array().cloned()).unwrap_or_default();
                let docs = state.documents.entry((*name).to_string()).or_default();
                let mut results = Vec::new();
                for mut doc in batch {
                    let action = doc["@search.action"].as_str().unwrap_or("upload").to_string();
                    let Some(id) = doc["id"].as_str().map(str::to_string) else {
                        results.push(json!({ "key": "", "status": false, "errorMessage": "missing id" }));
                        continue;
                    };
                    if action == "delete" {
                        docs.remove(&id);
                    } else {
                        if let Some(obj) = doc.as_object_mut() {
                            obj.remove("@search.action");
                        }
                        docs.insert(id.clone(), doc);
                    }
                    results.push(json!({ "key": id, "status": true }));
                }
                Ok(json!({ "value": results }))
            }
            (HttpMethod::Post, ["indexes", name, "docs", "search"]) => {
                let docs = state.documents.get(*name).cloned().unwrap_or_default();
                let search = body.and_then(|b| b["search"].as_str()).unwrap_or("*");
                let top = body.and_then(|b| b["top"].as_u64()).unwrap_or(1000) as usize;
                let rows: Vec<Value> = docs
                    .values()
                    .filter(|d| search == "*" || d["content"].as_str().is_some_and(|c| c.contains(search)))
                    .take(top)
                    .cloned()
                    .collect();
                Ok(json!({ "value": rows }))
            }
            (HttpMethod::Put, ["datasources", name]) => {
                state.datasources.insert((*name).to_string(), body.cloned().unwrap_or(Value::Null));
                Ok(body.cloned().unwrap_or(Value::Null))
            }
            (HttpMethod::Delete, ["datasources", name]) => {
                state.datasources.remove(*name);
                Ok(Value::Null)
            }
            (HttpMethod::Put, ["skillsets", name]) => {
                state.skillsets.insert((*name).to_string(), body.cloned().unwrap_or(Value::Null));
                Ok(body.cloned().unwrap_or(Value::Null))
            }
            (HttpMethod::Delete, ["skillsets", name]) => {
                state.skillsets.remove(*name);
                Ok(Value::Null)
            }
            (HttpMethod::Put, ["indexers", name]) => {
                if self.fail_indexer_creation.load(std::sync::atomic::Ordering::SeqCst) {
                    return Err(Error::http_status("PUT", path, 500));
                }
                state.indexers.insert((*name).to_string(), body.cloned().unwrap_or(Value::Null));
                Ok(body.cloned().unwrap_or(Value::Null))
            }
            (HttpMethod::Post, ["indexers", _name, "run"]) => Ok(json!({})),
            _ => Err(Error::internal(format!("unhandled fake route: {} {path}", method.as_str()))),
        }
    }
}
