//! Caps concurrent outbound calls and enforces a floor between
//! successive calls, independent of any per-call retry/backoff logic.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use codeindex_domain::constants::{DEFAULT_MAX_CONCURRENT_CALLS, DEFAULT_MIN_CALL_INTERVAL_MS};
use codeindex_domain::error::{Error, Result};
use codeindex_domain::ports::{HttpMethod, QueryParam, RestClient};
use serde_json::Value;

/// Token held while a rate-limited call is in flight; dropping it frees
/// the concurrency slot for the next waiter.
pub struct RateLimitPermit {
    _permit: OwnedSemaphorePermit,
}

/// Bounds concurrent calls to `max_concurrent` and spaces successive
/// acquisitions at least `min_interval` apart.
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    min_interval: Duration,
    last_acquired: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Build a limiter with explicit bounds.
    pub fn new(max_concurrent: usize, min_interval: Duration) -> Self {
        Self { semaphore: Arc::new(Semaphore::new(max_concurrent)), min_interval, last_acquired: Mutex::new(None) }
    }

    /// Wait for a concurrency slot and for the minimum inter-call
    /// interval to have elapsed since the previous acquisition.
    pub async fn acquire(&self) -> RateLimitPermit {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("rate limiter semaphore is never closed");

        let mut last_acquired = self.last_acquired.lock().await;
        if let Some(last) = *last_acquired {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last_acquired = Some(Instant::now());

        RateLimitPermit { _permit: permit }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT_CALLS, Duration::from_millis(DEFAULT_MIN_CALL_INTERVAL_MS))
    }
}

/// Wraps any `RestClient` with the cross-cutting limiter, so
/// `SearchOperations` and every automation use case above it get
/// concurrency bounds and inter-call spacing for free, without knowing
/// about `RateLimiter` at all.
pub struct RateLimitedClient<C: RestClient> {
    inner: C,
    limiter: RateLimiter,
}

impl<C: RestClient> RateLimitedClient<C> {
    /// Wrap `inner`, bounding it with `limiter`.
    pub fn new(inner: C, limiter: RateLimiter) -> Self {
        Self { inner, limiter }
    }
}

#[async_trait]
impl<C: RestClient> RestClient for RateLimitedClient<C> {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[QueryParam<'_>],
        body: Option<&Value>,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let _permit = tokio::select! {
            permit = self.limiter.acquire() => permit,
            () = cancel.cancelled() => {
                return Err(Error::request("request cancelled while waiting for a rate limit slot"));
            }
        };
        self.inner.request(method, path, query, body, cancel).await
    }
}
