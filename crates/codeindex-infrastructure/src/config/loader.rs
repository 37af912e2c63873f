//! Layered configuration loading: defaults, then an optional TOML file,
//! then environment variables — each layer overriding the last.

use std::path::{Path, PathBuf};

use codeindex_domain::error::{Error, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};

use super::types::Config;

/// Environment variable prefix for override layers (`CODEINDEX_ENDPOINT`,
/// `CODEINDEX_BATCH_SIZE`, ...).
pub const ENV_PREFIX: &str = "CODEINDEX";

/// Default config file name looked up in the current directory and the
/// platform config directory when no explicit path is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "codeindex.toml";

/// Builds a `Config` by merging defaults, an optional TOML file, and
/// environment variables, then validating the result.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// A loader with no explicit file path; `load` falls back to
    /// `find_default_config_path`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path` specifically, bypassing the default search.
    pub fn with_config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Merge defaults, file, and environment, then validate.
    ///
    /// Layer order: `Config::default()` < TOML file (if found) <
    /// `CODEINDEX_*` environment variables.
    pub fn load(&self) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        let path = self.config_path.clone().or_else(Self::find_default_config_path);
        if let Some(path) = &path {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(&format!("{ENV_PREFIX}_")).split("_"));

        let config: Config = figment.extract().map_err(|e| Error::config(format!("failed to extract configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn find_default_config_path() -> Option<PathBuf> {
        let candidates = [
            std::env::current_dir().ok().map(|d| d.join(DEFAULT_CONFIG_FILENAME)),
            dirs::config_dir().map(|d| d.join("codeindex").join(DEFAULT_CONFIG_FILENAME)),
        ];
        candidates.into_iter().flatten().find(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn an_explicit_file_overrides_defaults_and_env_overrides_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"endpoint = "https://from-file.search.windows.net""#).unwrap();
        writeln!(file, r#"api_key = "file-key""#).unwrap();
        writeln!(file, "batch_size = 250").unwrap();
        file.flush().unwrap();

        // SAFETY: test runs single-threaded within this process; no other
        // test reads CODEINDEX_BATCH_SIZE concurrently.
        unsafe {
            std::env::set_var("CODEINDEX_BATCH_SIZE", "500");
        }
        let config = ConfigLoader::new().with_config_path(file.path()).load().unwrap();
        unsafe {
            std::env::remove_var("CODEINDEX_BATCH_SIZE");
        }

        assert_eq!(config.endpoint, "https://from-file.search.windows.net");
        assert_eq!(config.batch_size, 500);
    }

    #[test]
    fn a_missing_file_falls_back_to_defaults_and_then_fails_validation() {
        let loader = ConfigLoader::new().with_config_path("/nonexistent/codeindex.toml");
        assert!(loader.load().is_err());
    }
}
