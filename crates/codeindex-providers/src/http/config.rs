//! HTTP client pool configuration.

use std::time::Duration;

/// Connection-pool and timeout knobs for the REST client.
///
/// Mirrors the shape of a typical `reqwest::ClientBuilder` configuration
/// struct: separated from the client itself so it can be constructed from
/// `Config` without reaching into `reqwest` types at the call site.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum idle connections kept per host.
    pub max_idle_per_host: usize,
    /// How long an idle pooled connection is kept before being closed.
    pub idle_timeout: Duration,
    /// TCP keep-alive duration.
    pub keepalive: Duration,
    /// Total timeout for a single request attempt.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 10,
            idle_timeout: Duration::from_secs(90),
            keepalive: Duration::from_secs(60),
            timeout: Duration::from_secs(30),
            user_agent: format!("codeindex/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
