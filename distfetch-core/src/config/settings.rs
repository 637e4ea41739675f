//! Fetch configuration for distfetch.
//!
//! Settings are plain JSON on disk, with environment overrides applied on top
//! so CI jobs can relocate the cache without writing a file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

// =============================================================================
// Defaults
// =============================================================================

/// Endpoint answering with the preferred Apache mirror as plain text.
pub const DEFAULT_MIRROR_RESOLVER_URL: &str =
    "https://www.apache.org/dyn/closer.lua?preferred=true";

/// Canonical Apache archive, used when the mirror is stale or unreachable.
pub const DEFAULT_ARCHIVE_BASE_URL: &str = "https://archive.apache.org/dist";

/// Maven Central, source of the pinned Flink runtime jars.
pub const DEFAULT_MAVEN_REPOSITORY_URL: &str = "https://repo1.maven.org/maven2";

/// Subprocess output is logged at most once per this many seconds per stream.
pub const DEFAULT_OUTPUT_LOG_INTERVAL_SECS: u64 = 5;

const ENV_CACHE_DIR: &str = "DISTFETCH_CACHE_DIR";
const ENV_MIRROR_RESOLVER_URL: &str = "DISTFETCH_MIRROR_RESOLVER_URL";
const ENV_ARCHIVE_URL: &str = "DISTFETCH_ARCHIVE_URL";
const ENV_MAVEN_REPOSITORY_URL: &str = "DISTFETCH_MAVEN_REPOSITORY_URL";
const ENV_COMMAND_TIMEOUT_SECS: &str = "DISTFETCH_COMMAND_TIMEOUT_SECS";

/// Returns `~/.cache`, or a `.cache` folder in the OS temp dir when the home
/// directory cannot be determined.
pub fn default_cache_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".cache")
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid URL for {field}: {value} ({source})")]
    InvalidUrl {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

// =============================================================================
// Fetch Configuration
// =============================================================================

/// Where distributions are cached and where they are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Root of the cache; each project gets its own subdirectory.
    pub cache_root: PathBuf,

    /// Mirror-resolution endpoint.
    pub mirror_resolver_url: String,

    /// Base of the canonical archive (`<base>/<remote path>/...`).
    pub archive_base_url: String,

    /// Maven repository used for the extra Flink jars.
    pub maven_repository_url: String,

    /// Kill subprocesses running longer than this. `None` waits forever.
    pub command_timeout_secs: Option<u64>,

    /// Throttle window for logging subprocess output.
    pub output_log_interval_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            cache_root: default_cache_root(),
            mirror_resolver_url: DEFAULT_MIRROR_RESOLVER_URL.to_string(),
            archive_base_url: DEFAULT_ARCHIVE_BASE_URL.to_string(),
            maven_repository_url: DEFAULT_MAVEN_REPOSITORY_URL.to_string(),
            command_timeout_secs: None,
            output_log_interval_secs: DEFAULT_OUTPUT_LOG_INTERVAL_SECS,
        }
    }
}

/// Parsed, validated endpoints derived from a [`FetchConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub mirror_resolver: Url,
    pub archive_base: Url,
    pub maven_repository: Url,
}

impl FetchConfig {
    /// Creates a config rooted at `cache_root` with default endpoints.
    pub fn with_cache_root(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            ..Self::default()
        }
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `DISTFETCH_*` environment variables on top of this config.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_CACHE_DIR) {
            self.cache_root = PathBuf::from(dir);
        }
        if let Some(url) = lookup(ENV_MIRROR_RESOLVER_URL) {
            self.mirror_resolver_url = url;
        }
        if let Some(url) = lookup(ENV_ARCHIVE_URL) {
            self.archive_base_url = url;
        }
        if let Some(url) = lookup(ENV_MAVEN_REPOSITORY_URL) {
            self.maven_repository_url = url;
        }
        if let Some(secs) = lookup(ENV_COMMAND_TIMEOUT_SECS) {
            let parsed = secs.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: ENV_COMMAND_TIMEOUT_SECS,
                value: secs.clone(),
            })?;
            // 0 disables the timeout
            self.command_timeout_secs = (parsed > 0).then_some(parsed);
        }
        Ok(self)
    }

    /// Parse and validate the configured endpoints.
    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        Ok(Endpoints {
            mirror_resolver: parse_url("mirror_resolver_url", &self.mirror_resolver_url)?,
            archive_base: parse_url("archive_base_url", &self.archive_base_url)?,
            maven_repository: parse_url("maven_repository_url", &self.maven_repository_url)?,
        })
    }

    /// Subprocess timeout, if any.
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }

    /// Throttle window for subprocess output logging.
    pub fn output_log_interval(&self) -> Duration {
        Duration::from_secs(self.output_log_interval_secs)
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        });
    }

    Ok(url)
}

// =============================================================================
// Tests
// =============================================================================
