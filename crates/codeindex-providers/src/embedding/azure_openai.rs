//! Azure OpenAI-shaped embedding provider, grounded on the OpenAI REST
//! embedding wire shape. The embedding model's own API contract is out
//! of scope here, so only the HTTP call surface it takes (url, headers,
//! batch request/response shape) is implemented; the provider-specific
//! authentication scheme is left to `api_key`.

use std::time::Duration;

use async_trait::async_trait;
use codeindex_domain::error::{Error, Result};
use codeindex_domain::ports::EmbeddingProvider;
use codeindex_domain::value_objects::Embedding;
use reqwest::Client;

/// Embeds text by calling a deployed embedding model over HTTPS.
pub struct AzureOpenAiEmbeddingProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    timeout: Duration,
}

impl AzureOpenAiEmbeddingProvider {
    /// Build a provider posting to `{base_url}/embeddings`, authenticating
    /// with `api_key`, using deployment `model` which produces vectors of
    /// `dimensions` length.
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            dimensions,
            timeout,
        }
    }

    async fn fetch_embeddings(&self, texts: &[String]) -> Result<serde_json::Value> {
        let payload = serde_json::json!({
            "input": texts,
            "model": self.model,
            "encoding_format": "float",
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(format!("embedding request timed out after {:?}", self.timeout))
                } else {
                    Error::request(format!("embedding HTTP request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http_status("POST", "/embeddings", status.as_u16()));
        }
        response.json().await.map_err(|e| Error::request(format!("invalid embedding response: {e}")))
    }
}

#[async_trait]
impl EmbeddingProvider for AzureOpenAiEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self.fetch_embeddings(texts).await?;
        let data = response["data"]
            .as_array()
            .ok_or_else(|| Error::request("embedding response missing \"data\" array"))?;

        if data.len() != texts.len() {
            return Err(Error::request(format!(
                "embedding response count mismatch: expected {}, got {}",
                texts.len(),
                data.len()
            )));
        }

        data.iter()
            .map(|item| {
                let vector: Vec<f32> = item["embedding"]
                    .as_array()
                    .ok_or_else(|| Error::request("embedding item missing \"embedding\" array"))?
                    .iter()
                    .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                    .collect();
                Ok(Embedding::new(vector, self.model.clone()))
            })
            .collect()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "azure_openai"
    }
}
