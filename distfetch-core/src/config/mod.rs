//! Configuration module for distfetch.
//!
//! Manages the cache location, download endpoints, and subprocess limits.

mod settings;

pub use settings::{
    default_cache_root, ConfigError, Endpoints, FetchConfig, DEFAULT_ARCHIVE_BASE_URL,
    DEFAULT_MAVEN_REPOSITORY_URL, DEFAULT_MIRROR_RESOLVER_URL, DEFAULT_OUTPUT_LOG_INTERVAL_SECS,
};
