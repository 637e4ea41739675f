//! distfetch Core Library
//!
//! This crate provides cached Apache distributions for integration tests.
//! It includes:
//!
//! - Configuration of the cache root and download endpoints
//! - Preferred-mirror resolution with fallback to the Apache archive
//! - Subprocess execution for `wget`, `tar` and `mv`
//! - Per-project entry points for Spark, Flink and Hadoop

pub mod config;
pub mod dist;

// Re-exports for convenience
pub use config::{ConfigError, FetchConfig};
pub use dist::{
    ArchiveSpec, CommandRunner, DistCache, FetchError, FetchResult, MirrorResolver, Project,
    SemanticVersion, ShellRunner,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
