//! Structured logging setup over the `tracing` ecosystem: `EnvFilter`
//! level selection, optional JSON formatting, optional daily-rotated file
//! output alongside stdout.
//!
//! `RestClient` implementations only ever pass `method`, `path`, `status`,
//! and a synthetic failure reason into these macros — request/response
//! bodies and headers never reach a log record.

use codeindex_domain::error::{Error, Result};
use tracing::{Level, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

pub use crate::config::LoggingConfig;

/// Environment variable consulted for a filter directive, taking
/// precedence over `config.level` when set (e.g. `CODEINDEX_LOG=debug`).
const ENV_FILTER_VAR: &str = "CODEINDEX_LOG";

/// Install a global `tracing` subscriber per `config`. Call once at
/// process start; a second call returns an error rather than panicking.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter = create_log_filter(&config.level);
    let file_appender = create_file_appender(config.file_output.as_deref());

    if config.json_format {
        init_json_logging(filter, file_appender)
    } else {
        init_text_logging(filter, file_appender)
    }?;

    info!(level = %level, "logging initialized");
    Ok(())
}

fn create_log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(ENV_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new(level))
}

fn create_file_appender(file_output: Option<&std::path::Path>) -> Option<tracing_appender::rolling::RollingFileAppender> {
    file_output.map(|path| {
        tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| std::path::Path::new(".")),
            path.file_stem().unwrap_or_else(|| std::ffi::OsStr::new("codeindex")),
        )
    })
}

fn init_json_logging(filter: EnvFilter, file_appender: Option<tracing_appender::rolling::RollingFileAppender>) -> Result<()> {
    let stdout = fmt::layer().json().with_target(true).with_file(true).with_line_number(true);
    let registry = Registry::default().with(filter);
    let result = if let Some(appender) = file_appender {
        let file = fmt::layer().json().with_writer(appender).with_ansi(false).with_target(true);
        registry.with(stdout).with(file).try_init()
    } else {
        registry.with(stdout).try_init()
    };
    result.map_err(|e| Error::internal(format!("failed to install logging subscriber: {e}")))
}

fn init_text_logging(filter: EnvFilter, file_appender: Option<tracing_appender::rolling::RollingFileAppender>) -> Result<()> {
    let stdout = fmt::layer().with_target(true).with_file(true).with_line_number(true);
    let registry = Registry::default().with(filter);
    let result = if let Some(appender) = file_appender {
        let file = fmt::layer().with_writer(appender).with_ansi(false).with_target(true);
        registry.with(stdout).with(file).try_init()
    } else {
        registry.with(stdout).try_init()
    };
    result.map_err(|e| Error::internal(format!("failed to install logging subscriber: {e}")))
}

/// Parse a level string (`trace`/`debug`/`info`/`warn`/`error`, also
/// `warning`) into a `tracing::Level`.
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::config(format!("invalid log level {level:?}; use trace, debug, info, warn, or error"))),
    }
}

/// Log a configuration file discovery/load outcome.
pub fn log_config_loaded(path: &std::path::Path, found: bool) {
    if found {
        info!(path = %path.display(), "configuration loaded");
    } else {
        warn!(path = %path.display(), "configuration file not found; using defaults and environment");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_levels_parse() {
        assert_eq!(parse_log_level("INFO").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
    }

    #[test]
    fn an_unknown_level_is_a_config_error() {
        assert!(parse_log_level("verbose").is_err());
    }
}
