//! Cross-cutting constants that several modules need to agree on.

/// API version pinned for the managed search service's REST surface.
pub const API_VERSION: &str = "2025-05-01-preview";

/// Maximum number of documents in a single upload/merge batch.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Maximum size in bytes of a single document batch payload before it is
/// split further — 1 MiB plus 5% headroom for JSON framing, matching the
/// service's per-batch request-body limit.
pub const MAX_BATCH_PAYLOAD_BYTES: usize = (1024 * 1024) * 21 / 20;

/// HTTP statuses the REST client treats as transient and worth retrying.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Number of attempts (including the first) the REST client makes before
/// giving up on a retryable failure.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff between retry attempts, in
/// milliseconds (attempt 1 waits `RETRY_BASE_DELAY_MS`, attempt 2 waits
/// `2 * RETRY_BASE_DELAY_MS`).
pub const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Default dense vector dimensionality when a provider doesn't override it.
pub const DEFAULT_VECTOR_DIMENSIONS: usize = 1536;

/// Default ceiling on concurrent outbound calls to the managed service.
pub const DEFAULT_MAX_CONCURRENT_CALLS: usize = 10;

/// Default floor, in milliseconds, between successive calls from one
/// caller to keep the service's own rate limiter happy.
pub const DEFAULT_MIN_CALL_INTERVAL_MS: u64 = 100;

/// Storage size, in bytes, past which `analyze_reindex_need` recommends
/// optimization — 10 GiB.
pub const INDEX_SIZE_OPTIMIZATION_THRESHOLD_BYTES: u64 = 10 * 1024 * 1024 * 1024;
