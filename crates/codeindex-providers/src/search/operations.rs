//! Wraps a `RestClient` with the managed search service's full operation
//! set: index/datasource/skillset/indexer CRUD, document batches, and
//! search.

use std::sync::Arc;
use std::time::{Duration, Instant};

use codeindex_domain::error::{Error, Result};
use codeindex_domain::ports::{HttpMethod, RestClient};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

/// Thin, stateless wrapper translating domain intents into REST calls.
///
/// Generic over `RestClient` so tests can substitute an in-memory fake or
/// a `wiremock`-backed server without touching the automation layer above it.
pub struct SearchOperations<C: RestClient> {
    client: Arc<C>,
}

impl<C: RestClient> SearchOperations<C> {
    /// Wrap `client`.
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    // ---------- Index operations ----------

    /// Create or update an index. The service treats `PUT` as an upsert.
    pub async fn create_index(&self, index_definition: &Value, cancel: &CancellationToken) -> Result<Value> {
        let name = index_definition["name"]
            .as_str()
            .ok_or_else(|| Error::validation("index definition missing \"name\""))?;
        self.client
            .request(HttpMethod::Put, &format!("/indexes/{name}"), &[], Some(index_definition), cancel)
            .await
    }

    /// Delete an index. Returns `Ok(())` even if the index didn't exist.
    pub async fn delete_index(&self, name: &str, cancel: &CancellationToken) -> Result<()> {
        match self.client.request(HttpMethod::Delete, &format!("/indexes/{name}"), &[], None, cancel).await {
            Ok(_) => Ok(()),
            Err(Error::HttpStatus { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Fetch an index definition.
    pub async fn get_index(&self, name: &str, cancel: &CancellationToken) -> Result<Value> {
        self.client.request(HttpMethod::Get, &format!("/indexes/{name}"), &[], None, cancel).await
    }

    /// List all index definitions.
    pub async fn list_indexes(&self, cancel: &CancellationToken) -> Result<Vec<Value>> {
        let result = self.client.request(HttpMethod::Get, "/indexes", &[], None, cancel).await?;
        Ok(result["value"].as_array().cloned().unwrap_or_default())
    }

    /// Document count and storage size for an index.
    pub async fn get_index_stats(&self, name: &str, cancel: &CancellationToken) -> Result<Value> {
        self.client.request(HttpMethod::Get, &format!("/indexes/{name}/stats"), &[], None, cancel).await
    }

    // ---------- Document operations ----------

    /// Upload (or merge-upload) a batch of documents.
    ///
    /// Each document gets `@search.action` set to `"merge"` when `merge`
    /// is `true`, otherwise `"upload"` (full replace).
    pub async fn upload_documents(
        &self,
        index_name: &str,
        documents: &[Value],
        merge: bool,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let action = if merge { "merge" } else { "upload" };
        let batch: Vec<Value> = documents
            .iter()
            .map(|doc| {
                let mut doc = doc.clone();
                if let Some(obj) = doc.as_object_mut() {
                    obj.insert("@search.action".to_string(), json!(action));
                }
                doc
            })
            .collect();
        self.client
            .request(
                HttpMethod::Post,
                &format!("/indexes/{index_name}/docs/index"),
                &[],
                Some(&json!({ "value": batch })),
                cancel,
            )
            .await
    }

    /// Delete documents by key.
    pub async fn delete_documents(&self, index_name: &str, keys: &[String], cancel: &CancellationToken) -> Result<Value> {
        let batch: Vec<Value> =
            keys.iter().map(|key| json!({ "@search.action": "delete", "id": key })).collect();
        self.client
            .request(
                HttpMethod::Post,
                &format!("/indexes/{index_name}/docs/index"),
                &[],
                Some(&json!({ "value": batch })),
                cancel,
            )
            .await
    }

    /// Total document count in an index.
    pub async fn count_documents(&self, index_name: &str, cancel: &CancellationToken) -> Result<u64> {
        let result = self
            .client
            .request(HttpMethod::Get, &format!("/indexes/{index_name}/docs/$count"), &[], None, cancel)
            .await?;
        Ok(result.as_u64().or_else(|| result["@odata.count"].as_u64()).unwrap_or(0))
    }

    /// Run a raw search request; `body` carries `search`, `filter`,
    /// `select`, `top`, `skip`, vector queries, and any other option the
    /// caller needs.
    pub async fn search(&self, index_name: &str, body: &Value, cancel: &CancellationToken) -> Result<Value> {
        self.client
            .request(HttpMethod::Post, &format!("/indexes/{index_name}/docs/search"), &[], Some(body), cancel)
            .await
    }

    // ---------- Indexer operations ----------

    /// Create or update an indexer.
    pub async fn create_indexer(&self, indexer_definition: &Value, cancel: &CancellationToken) -> Result<Value> {
        let name = indexer_definition["name"]
            .as_str()
            .ok_or_else(|| Error::validation("indexer definition missing \"name\""))?;
        self.client
            .request(HttpMethod::Put, &format!("/indexers/{name}"), &[], Some(indexer_definition), cancel)
            .await
    }

    /// Delete an indexer.
    pub async fn delete_indexer(&self, name: &str, cancel: &CancellationToken) -> Result<()> {
        match self.client.request(HttpMethod::Delete, &format!("/indexers/{name}"), &[], None, cancel).await {
            Ok(_) => Ok(()),
            Err(Error::HttpStatus { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Fetch indexer execution status and history.
    pub async fn get_indexer_status(&self, name: &str, cancel: &CancellationToken) -> Result<Value> {
        self.client.request(HttpMethod::Get, &format!("/indexers/{name}/status"), &[], None, cancel).await
    }

    /// Kick off an on-demand indexer run.
    ///
    /// When `wait` is `true`, polls `get_indexer_status` every
    /// `poll_interval` until the last run reaches a terminal status or
    /// `timeout` elapses, in which case `Error::Timeout` is returned.
    pub async fn run_indexer(
        &self,
        name: &str,
        wait: bool,
        poll_interval: Duration,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        self.client.request(HttpMethod::Post, &format!("/indexers/{name}/run"), &[], None, cancel).await?;
        if !wait {
            return Ok(json!({ "started": true }));
        }

        let start = Instant::now();
        while start.elapsed() < timeout {
            let status = self.get_indexer_status(name, cancel).await?;
            let last_status = status["lastResult"]["status"].as_str().unwrap_or("").to_lowercase();
            if matches!(last_status.as_str(), "success" | "transientfailure" | "error") {
                return Ok(json!({ "completed": true, "status": status }));
            }
            tokio::select! {
                () = tokio::time::sleep(poll_interval) => {}
                () = cancel.cancelled() => {
                    return Err(Error::request(format!("indexer {name} run polling cancelled")));
                }
            }
        }
        Err(Error::timeout(format!("indexer {name} run did not finish within {timeout:?}")))
    }

    /// Reset indexer change-tracking state.
    pub async fn reset_indexer(&self, name: &str, cancel: &CancellationToken) -> Result<()> {
        self.client.request(HttpMethod::Post, &format!("/indexers/{name}/reset"), &[], None, cancel).await?;
        Ok(())
    }

    // ---------- Data source operations ----------

    /// Create or update a data source.
    pub async fn create_datasource(&self, datasource_definition: &Value, cancel: &CancellationToken) -> Result<Value> {
        let name = datasource_definition["name"]
            .as_str()
            .ok_or_else(|| Error::validation("data source definition missing \"name\""))?;
        self.client
            .request(HttpMethod::Put, &format!("/datasources/{name}"), &[], Some(datasource_definition), cancel)
            .await
    }

    /// Delete a data source.
    pub async fn delete_datasource(&self, name: &str, cancel: &CancellationToken) -> Result<()> {
        match self.client.request(HttpMethod::Delete, &format!("/datasources/{name}"), &[], None, cancel).await {
            Ok(_) => Ok(()),
            Err(Error::HttpStatus { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // ---------- Skillset operations ----------

    /// Create or update a skillset.
    pub async fn create_skillset(&self, skillset_definition: &Value, cancel: &CancellationToken) -> Result<Value> {
        let name = skillset_definition["name"]
            .as_str()
            .ok_or_else(|| Error::validation("skillset definition missing \"name\""))?;
        self.client
            .request(HttpMethod::Put, &format!("/skillsets/{name}"), &[], Some(skillset_definition), cancel)
            .await
    }

    /// Delete a skillset.
    pub async fn delete_skillset(&self, name: &str, cancel: &CancellationToken) -> Result<()> {
        match self.client.request(HttpMethod::Delete, &format!("/skillsets/{name}"), &[], None, cancel).await {
            Ok(_) => Ok(()),
            Err(Error::HttpStatus { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // ---------- Service operations ----------

    /// Service-level statistics (counters and limits).
    pub async fn get_service_statistics(&self, cancel: &CancellationToken) -> Result<Value> {
        self.client.request(HttpMethod::Get, "/servicestats", &[], None, cancel).await
    }
}
