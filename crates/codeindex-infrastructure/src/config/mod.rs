//! Layered configuration: a closed option set loaded from defaults, an
//! optional TOML file, and environment variables.

mod loader;
mod types;

pub use loader::{ConfigLoader, DEFAULT_CONFIG_FILENAME, ENV_PREFIX};
pub use types::{Config, EmbeddingOptions, LoggingConfig};
