//! Client configuration.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. an optional TOML file (`clipper.toml` unless another path is given)
//! 3. `CLIPPER_*` environment variables, e.g. `CLIPPER_API_URL`

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::adapters::{DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};
use crate::cache::DEFAULT_CACHE_TTL;

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "clipper.toml";

const ENV_PREFIX: &str = "CLIPPER";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or did not match the expected shape.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The API base URL is unusable.
    #[error("invalid api_url '{url}': {reason}")]
    InvalidUrl {
        /// Offending value.
        url: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A zero timeout would fail every call.
    #[error("timeout_ms must be greater than zero")]
    InvalidTimeout,
}

/// Settings for the API client and its local state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every endpoint is appended to, without a trailing slash.
    pub api_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Directory holding `session.json`.
    pub data_dir: PathBuf,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Lifetime of cached reads, in seconds. Zero disables the cache.
    pub cache_ttl_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            data_dir: default_data_dir(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from `file` (or `clipper.toml` when present) and
    /// the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or a value is invalid. An
    /// explicitly named file must exist.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::build(file, None)
    }

    /// Like [`ClientConfig::load`], with `env` standing in for the process
    /// environment.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::load`].
    pub fn build(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("timeout_ms", defaults.timeout_ms)?
            .set_default("data_dir", defaults.data_dir.to_string_lossy().into_owned())?
            .set_default("user_agent", defaults.user_agent)?
            .set_default("cache_ttl_secs", defaults.cache_ttl_secs)?;

        builder = match file {
            Some(path) => builder.add_source(File::from(path).format(FileFormat::Toml)),
            None => builder.add_source(
                File::with_name(DEFAULT_CONFIG_FILE)
                    .format(FileFormat::Toml)
                    .required(false),
            ),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache lifetime, or `None` when caching is off.
    #[must_use]
    pub const fn cache_ttl(&self) -> Option<Duration> {
        if self.cache_ttl_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.cache_ttl_secs))
        }
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: self.api_url.clone(),
            reason,
        };

        let url = Url::parse(&self.api_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        self.api_url = self.api_url.trim_end_matches('/').to_string();
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map_or_else(|| PathBuf::from(".clipper"), |dir| dir.join("clipper"))
}
