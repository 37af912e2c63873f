//! Concrete `RestClient` for the managed search service's REST surface.

use std::time::Duration;

use async_trait::async_trait;
use codeindex_domain::constants::{MAX_RETRY_ATTEMPTS, RETRYABLE_STATUSES, RETRY_BASE_DELAY_MS};
use codeindex_domain::error::{Error, Result};
use codeindex_domain::ports::{HttpMethod, QueryParam, RestClient};
use reqwest::Client;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::config::HttpClientConfig;

/// Talks to a single search service endpoint over HTTPS, stamping every
/// request with `api-version` and `api-key`, and retrying transient
/// failures with exponential backoff.
///
/// `init → use → cleanup`: the pooled client is built once in `new` and
/// released in `cleanup`, mirroring the lifecycle the rest of the
/// automation layer expects.
pub struct ReqwestRestClient {
    client: Option<Client>,
    endpoint: String,
    api_key: String,
    api_version: String,
}

impl ReqwestRestClient {
    /// Build a client against `endpoint` (e.g.
    /// `https://my-service.search.windows.net`), authenticating with
    /// `api_key` and pinning every request to `api_version`.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
        config: HttpClientConfig,
    ) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(config.idle_timeout)
            .tcp_keepalive(config.keepalive)
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client: Some(client),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version: api_version.into(),
        })
    }

    /// Drop the pooled client, closing kept-alive connections.
    pub fn cleanup(&mut self) {
        self.client = None;
    }

    fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or_else(|| Error::internal("REST client already cleaned up"))
    }

    fn backoff_delay(attempt: u32) -> Duration {
        Duration::from_millis(RETRY_BASE_DELAY_MS * u64::from(attempt))
    }
}

#[async_trait]
impl RestClient for ReqwestRestClient {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[QueryParam<'_>],
        body: Option<&Value>,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        if cancel.is_cancelled() {
            return Err(Error::request("request cancelled before it was sent"));
        }

        let client = self.client()?;
        let url = format!("{}{}", self.endpoint, path);

        let mut last_error: Option<Error> = None;
        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            let mut builder = match method {
                HttpMethod::Get => client.get(&url),
                HttpMethod::Put => client.put(&url),
                HttpMethod::Post => client.post(&url),
                HttpMethod::Delete => client.delete(&url),
            };
            builder = builder
                .query(&[("api-version", self.api_version.as_str())])
                .query(query)
                .header("api-key", &self.api_key);
            if let Some(body) = body {
                builder = builder.json(body);
            }

            let outcome = tokio::select! {
                result = builder.send() => result,
                () = cancel.cancelled() => return Err(Error::request("request cancelled while in flight")),
            };
            match outcome {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        if status.as_u16() == 204 {
                            return Ok(Value::Null);
                        }
                        return response.json::<Value>().await.map_err(|e| {
                            Error::request(format!("failed to decode response body: {e}"))
                        });
                    }
                    let status_code = status.as_u16();
                    tracing::warn!(
                        method = method.as_str(),
                        path,
                        status = status_code,
                        "request failed"
                    );
                    if RETRYABLE_STATUSES.contains(&status_code) && attempt < MAX_RETRY_ATTEMPTS {
                        last_error = Some(Error::http_status(method.as_str(), path, status_code));
                        tokio::select! {
                            () = tokio::time::sleep(Self::backoff_delay(attempt)) => {}
                            () = cancel.cancelled() => return Err(Error::request("request cancelled during backoff")),
                        }
                        continue;
                    }
                    if status_code == 429 {
                        return Err(Error::rate_limited(format!(
                            "{} {path} rate limited after {attempt} attempt(s)",
                            method.as_str()
                        )));
                    }
                    return Err(Error::http_status(method.as_str(), path, status_code));
                }
                Err(e) => {
                    tracing::warn!(method = method.as_str(), path, attempt, "network error");
                    last_error = Some(Error::request(e.to_string()));
                    if attempt < MAX_RETRY_ATTEMPTS {
                        tokio::select! {
                            () = tokio::time::sleep(Self::backoff_delay(attempt)) => {}
                            () = cancel.cancelled() => return Err(Error::request("request cancelled during backoff")),
                        }
                        continue;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::request("request failed with no recorded cause")))
    }
}
