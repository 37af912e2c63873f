//! REST transport port.
//!
//! Abstracts the wire contract with the managed search service so that
//! `SearchOperations` and friends can be exercised against a fake in tests
//! without depending on `codeindex-providers`' concrete reqwest client.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// HTTP method for a `RestClient` call. Kept as an explicit enum (rather
/// than threading `reqwest::Method` into the domain crate) to keep this
/// port free of transport-layer dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET.
    Get,
    /// PUT — used for idempotent definition upserts.
    Put,
    /// POST — used for document batches and searches.
    Post,
    /// DELETE.
    Delete,
}

impl HttpMethod {
    /// The method name as it appears in logs (`"GET"`, `"PUT"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// A single key/value query parameter.
pub type QueryParam<'a> = (&'a str, &'a str);

/// Transport contract to the managed search service.
///
/// A single operation: send a request, get back parsed JSON or a
/// sanitized error. Implementations own retry, backoff, and the
/// `api-version`/`api-key` headers; callers never see raw bodies on
/// failure.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Issue one request, appending the service's `api-version` and
    /// `api-key`. Retries transient failures internally per the client's
    /// policy; returns `Error::HttpStatus`/`Error::Request` only after the
    /// retry budget is exhausted.
    ///
    /// `cancel` is checked between retry attempts and, where the
    /// implementation supports it, races the in-flight call itself;
    /// a cancelled request returns `Error::Request`.
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[QueryParam<'_>],
        body: Option<&Value>,
        cancel: &CancellationToken,
    ) -> Result<Value>;
}
