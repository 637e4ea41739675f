//! Distribution cache for integration tests.
//!
//! `DistCache` is the main entry point. Each `download_*` call computes the
//! expected install directory first and returns it untouched if it already
//! exists; otherwise the archive is fetched, extracted, and (for Flink) the
//! runtime layout is completed.
//!
//! Existence of the directory is the only "already downloaded" signal, so a
//! half-extracted install from an interrupted run is treated as complete.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::catalog::flink_setup_steps;
use super::fetcher::ArchiveFetcher;
use super::mirror::{ApacheMirrorResolver, MirrorResolver};
use super::paths;
use super::runner::{CommandRunner, ShellRunner};
use super::types::{ArchiveSpec, FetchError, FetchResult, Project};
use super::version::SemanticVersion;
use crate::config::{Endpoints, FetchConfig};

// ============================================================================
// Distribution Cache
// ============================================================================

/// Downloads Spark, Flink and Hadoop distributions into a local cache.
pub struct DistCache {
    cache_root: PathBuf,
    endpoints: Endpoints,
    runner: Arc<dyn CommandRunner>,
    fetcher: ArchiveFetcher,
}

impl DistCache {
    /// Creates a cache that shells out to real `wget`/`tar`/`mv` and asks
    /// the Apache mirror service for the preferred mirror.
    ///
    /// Nothing is created on disk until the first download.
    pub fn new(config: &FetchConfig) -> FetchResult<Self> {
        let endpoints = config.endpoints()?;
        let runner = ShellRunner::new()
            .with_timeout(config.command_timeout())
            .with_log_interval(config.output_log_interval());
        let mirrors = ApacheMirrorResolver::new(endpoints.mirror_resolver.clone());

        Ok(Self::from_parts(
            &config.cache_root,
            endpoints,
            Arc::new(runner),
            Arc::new(mirrors),
        ))
    }

    /// Creates a cache with a custom command runner and mirror resolver.
    pub fn with_components(
        config: &FetchConfig,
        runner: Arc<dyn CommandRunner>,
        mirrors: Arc<dyn MirrorResolver>,
    ) -> FetchResult<Self> {
        let endpoints = config.endpoints()?;
        Ok(Self::from_parts(&config.cache_root, endpoints, runner, mirrors))
    }

    fn from_parts(
        cache_root: &Path,
        endpoints: Endpoints,
        runner: Arc<dyn CommandRunner>,
        mirrors: Arc<dyn MirrorResolver>,
    ) -> Self {
        let cache_root = paths::absolute(cache_root);

        let fetcher = ArchiveFetcher::new(
            cache_root.clone(),
            endpoints.archive_base.clone(),
            runner.clone(),
            mirrors,
        );

        info!("DistCache initialized. Cache root: {}", cache_root.display());

        Self {
            cache_root,
            endpoints,
            runner,
            fetcher,
        }
    }

    /// Returns the cache root.
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// Ensures `spark-{version}-bin-hadoop{hadoop}` is cached and returns its path.
    pub async fn download_spark(
        &self,
        spark_version: &str,
        hadoop_version: &str,
    ) -> FetchResult<PathBuf> {
        let home = paths::spark_home(&self.cache_root, spark_version, hadoop_version);
        if is_downloaded(Project::Spark, &home) {
            return Ok(home);
        }

        let spec = ArchiveSpec::new(
            Project::Spark,
            spark_version,
            format!("-bin-hadoop{}.tgz", hadoop_version),
        );
        self.fetcher.fetch(&spec).await?;
        Ok(home)
    }

    /// Ensures `flink-{version}` is cached, with the extra Hive/YARN jars in
    /// `lib` and the planner/SQL client relocated, and returns its path.
    ///
    /// # Errors
    ///
    /// Fails before any download if `flink_version` is not a release version.
    /// A failure after extraction leaves the install directory as it is.
    pub async fn download_flink(
        &self,
        flink_version: &str,
        scala_version: &str,
    ) -> FetchResult<PathBuf> {
        let home = paths::flink_home(&self.cache_root, flink_version);
        if is_downloaded(Project::Flink, &home) {
            return Ok(home);
        }

        SemanticVersion::parse(flink_version)?;

        let spec = ArchiveSpec::new(
            Project::Flink,
            flink_version,
            format!("-bin-scala_{}.tgz", scala_version),
        );
        self.fetcher.fetch(&spec).await?;

        self.setup_flink_runtime(&home, flink_version, scala_version)
            .await
            .map_err(|source| FetchError::FlinkDependencies {
                version: flink_version.to_string(),
                source: Box::new(source),
            })?;

        Ok(home)
    }

    /// Ensures `hadoop-{version}` is cached and returns its path.
    pub async fn download_hadoop(&self, version: &str) -> FetchResult<PathBuf> {
        let home = paths::hadoop_home(&self.cache_root, version);
        if is_downloaded(Project::Hadoop, &home) {
            return Ok(home);
        }

        let spec = ArchiveSpec::new(Project::Hadoop, version, ".tar.gz");
        self.fetcher.fetch(&spec).await?;
        Ok(home)
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    async fn setup_flink_runtime(
        &self,
        home: &Path,
        flink_version: &str,
        scala_version: &str,
    ) -> FetchResult<()> {
        let steps = flink_setup_steps(
            home,
            flink_version,
            scala_version,
            &self.endpoints.maven_repository,
        )?;

        debug!("Running {} Flink setup steps in {}", steps.len(), home.display());
        for step in &steps {
            self.runner.run(&step.argv()).await?;
        }
        Ok(())
    }
}

fn is_downloaded(project: Project, home: &Path) -> bool {
    if home.exists() {
        info!(
            "Skip to download {} as it is already downloaded: {}",
            project,
            home.display()
        );
        true
    } else {
        false
    }
}
