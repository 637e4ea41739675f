//! Cached Apache distributions for integration tests.
//!
//! This module downloads Spark, Flink and Hadoop binary distributions into a
//! local cache, trying the preferred Apache mirror first and falling back to
//! the canonical archive. Transfers and extraction are delegated to `wget`,
//! `tar` and `mv`.
//!
//! # Architecture
//!
//! - `types`: Core types (Project, ArchiveSpec, FetchError)
//! - `paths`: Cache directory layout
//! - `urls`: Mirror, archive and Maven URL construction
//! - `version`: Release version comparison
//! - `runner`: Subprocess execution with concurrent output draining
//! - `mirror`: Preferred mirror resolution
//! - `fetcher`: Mirror-first, archive-fallback download and extraction
//! - `catalog`: Pinned extra jars and relocations for Flink
//! - `manager`: High-level API with the per-project entry points
//!
//! # Example
//!
//! ```ignore
//! use distfetch_core::{DistCache, FetchConfig};
//!
//! let cache = DistCache::new(&FetchConfig::default())?;
//!
//! let spark_home = cache.download_spark("3.4.1", "3").await?;
//! let flink_home = cache.download_flink("1.16.0", "2.12").await?;
//! println!("SPARK_HOME={}", spark_home.display());
//! ```

pub mod catalog;
pub mod fetcher;
pub mod manager;
pub mod mirror;
pub mod paths;
pub mod runner;
pub mod types;
pub mod urls;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use catalog::{flink_setup_steps, JarDefinition, SetupStep, FLINK_EXTRA_JARS};
pub use fetcher::ArchiveFetcher;
pub use manager::DistCache;
pub use mirror::{ApacheMirrorResolver, MirrorResolver, StaticMirror};
pub use runner::{CommandRunner, DrainStats, LogThrottle, ShellRunner};
pub use types::{ArchiveSpec, FetchError, FetchResult, Project};
pub use version::{ParseVersionError, SemanticVersion};
