//! The closed configuration option set.

use std::path::PathBuf;

use codeindex_domain::constants::{
    API_VERSION, DEFAULT_MIN_CALL_INTERVAL_MS, DEFAULT_VECTOR_DIMENSIONS, MAX_BATCH_SIZE, MAX_RETRY_ATTEMPTS, RETRY_BASE_DELAY_MS,
};
use codeindex_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Embedding provider selection and expected vector width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingOptions {
    /// Expected dense vector length (1536 or 3072).
    pub dimensions: usize,
    /// Provider name, or `None` to upload documents without vectors.
    pub provider: Option<String>,
}

impl Default for EmbeddingOptions {
    fn default() -> Self {
        Self { dimensions: DEFAULT_VECTOR_DIMENSIONS, provider: None }
    }
}

/// Structured logging knobs, layered in with the rest of `Config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `trace` | `debug` | `info` | `warn` | `error`.
    pub level: String,
    /// Emit JSON-formatted records instead of human-readable text.
    pub json_format: bool,
    /// Optional daily-rotated file output, in addition to stdout.
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json_format: false, file_output: None }
    }
}

/// The entire closed configuration surface: every option here mirrors one
/// row in the external-interfaces option table, no more and no less.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Managed service base URL.
    pub endpoint: String,
    /// Admin key for write operations.
    pub api_key: String,
    /// Wire version; defaults to the pinned `API_VERSION`.
    pub api_version: String,
    /// Default index for single-index workflows.
    pub index_name: String,
    /// Embedding dimensionality and provider selection.
    pub embedding: EmbeddingOptions,
    /// Default bulk upload batch size, capped at `MAX_BATCH_SIZE`.
    pub batch_size: usize,
    /// `RestClient` retry attempt budget.
    pub retry_attempts: u32,
    /// `RestClient` retry base delay, in seconds.
    pub retry_delay_seconds: f64,
    /// Inter-call floor for cleanup/export loops, in seconds.
    pub rate_limit_delay_seconds: f64,
    /// Honor `.gitignore`/`.ignore` files during repository traversal.
    pub respect_gitignore: bool,
    /// Directory/file name fragments excluded from traversal regardless
    /// of ignore files.
    pub default_excludes: Vec<String>,
    /// Permit indexing within ancestor directories that are themselves
    /// excluded.
    pub allow_external_roots: bool,
    /// Structured logging configuration.
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            api_version: API_VERSION.to_string(),
            index_name: "code-index".to_string(),
            embedding: EmbeddingOptions::default(),
            batch_size: 100,
            retry_attempts: MAX_RETRY_ATTEMPTS,
            retry_delay_seconds: RETRY_BASE_DELAY_MS as f64 / 1000.0,
            rate_limit_delay_seconds: DEFAULT_MIN_CALL_INTERVAL_MS as f64 / 1000.0,
            respect_gitignore: true,
            default_excludes: vec![".git".to_string(), "node_modules".to_string(), "target".to_string()],
            allow_external_roots: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Check the closed option set for internal consistency. Called by
    /// `ConfigLoader::load` after every merge so a bad file or environment
    /// override fails fast with a `Config` error rather than surfacing as
    /// a confusing request failure later.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::config("endpoint must not be empty"));
        }
        if self.api_key.trim().is_empty() {
            return Err(Error::config("api_key must not be empty"));
        }
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(Error::config(format!("batch_size must be between 1 and {MAX_BATCH_SIZE}, got {}", self.batch_size)));
        }
        if !matches!(self.embedding.dimensions, 1536 | 3072) {
            return Err(Error::config(format!("embedding.dimensions must be 1536 or 3072, got {}", self.embedding.dimensions)));
        }
        if let Some(provider) = &self.embedding.provider {
            if provider != "azure_openai" {
                return Err(Error::config(format!("embedding.provider must be \"azure_openai\" or absent, got {provider:?}")));
            }
        }
        Ok(())
    }
}
