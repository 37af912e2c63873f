//! Error taxonomy for the code-aware search indexing core.

use thiserror::Error;

/// Result type alias for operations that can fail.
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds surfaced by the core, mirroring the taxonomy in the design
/// (never a generic catch-all per call site — callers match on these).
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed endpoint/api key, or an unsupported api_version.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the misconfiguration.
        message: String,
    },

    /// Network failure surfaced after the retry budget is exhausted.
    #[error("request error: {message}")]
    Request {
        /// Description of the failure.
        message: String,
    },

    /// 4xx/5xx surfaced after retries. Body and headers are never carried
    /// here — only method, path, and status, per the logging contract.
    #[error("http {status} on {method} {path}")]
    HttpStatus {
        /// HTTP method of the failed request.
        method: String,
        /// Request path (no query string).
        path: String,
        /// HTTP status code returned by the service.
        status: u16,
    },

    /// The desired schema could not be created even after negotiation.
    #[error("schema incompatible: {message}")]
    SchemaIncompatible {
        /// Description of the incompatibility, with a drop-rebuild
        /// recommendation appended by the caller.
        message: String,
    },

    /// Per-item validation failure (vector dimension mismatch, missing
    /// required field, oversized document that cannot be truncated safely).
    #[error("validation error: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// HTTP 429 with the retry budget exhausted.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Description of the rate-limit condition.
        message: String,
    },

    /// A deadline was exceeded in `search` or `run(wait=true)`.
    #[error("timeout: {message}")]
    Timeout {
        /// Description of what timed out.
        message: String,
    },

    /// An exact-term search input was rejected as suspicious; the query
    /// still runs with a no-match clause substituted for the offending term.
    #[error("exact-term input rejected: {term}")]
    InjectionRejected {
        /// The term that triggered rejection (already sanitized for display).
        term: String,
    },

    /// Resource not found.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// I/O failure reading or writing local files (schema backups, repo walk).
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O failure.
        message: String,
        /// Underlying I/O error, if any.
        #[source]
        source: Option<std::io::Error>,
    },

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invariant violation or other unrecoverable internal condition.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the invariant violation.
        message: String,
    },
}

impl Error {
    /// Build a `Config` error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Build a `Request` error.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request { message: message.into() }
    }

    /// Build an `HttpStatus` error, redacting everything but method/path/status.
    pub fn http_status(method: impl Into<String>, path: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus { method: method.into(), path: path.into(), status }
    }

    /// Build a `SchemaIncompatible` error.
    pub fn schema_incompatible(message: impl Into<String>) -> Self {
        Self::SchemaIncompatible { message: message.into() }
    }

    /// Build a `Validation` error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    /// Build a `RateLimited` error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited { message: message.into() }
    }

    /// Build a `Timeout` error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout { message: message.into() }
    }

    /// Build a `NotFound` error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Build an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Whether this error is transient and may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { .. } => true,
            Self::HttpStatus { status, .. } => {
                matches!(status, 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io { message: source.to_string(), source: Some(source) }
    }
}
