//! Archive download with mirror-first, archive-fallback semantics.
//!
//! A release is fetched from the preferred mirror when possible; any failure
//! along that path (resolving the mirror, `wget`, or `tar`) falls back once to
//! the canonical Apache archive. There is no integrity check: a successful
//! `tar` exit is the only correctness signal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use super::mirror::MirrorResolver;
use super::paths;
use super::runner::CommandRunner;
use super::types::{ArchiveSpec, FetchError, FetchResult};
use super::urls::release_url;

/// Downloads release archives into the cache and extracts them in place.
pub struct ArchiveFetcher {
    cache_root: PathBuf,
    archive_base: Url,
    runner: Arc<dyn CommandRunner>,
    mirrors: Arc<dyn MirrorResolver>,
}

impl ArchiveFetcher {
    pub fn new(
        cache_root: PathBuf,
        archive_base: Url,
        runner: Arc<dyn CommandRunner>,
        mirrors: Arc<dyn MirrorResolver>,
    ) -> Self {
        Self {
            cache_root,
            archive_base,
            runner,
            mirrors,
        }
    }

    /// Fetches and extracts `spec` into `{cache}/{project}/`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Download`] if both the mirror and the archive
    /// attempt fail, or an I/O error if the project folder cannot be created.
    pub async fn fetch(&self, spec: &ArchiveSpec) -> FetchResult<()> {
        let project_dir = paths::project_dir(&self.cache_root, spec.project);
        paths::ensure_dir(&project_dir).await?;

        match self.fetch_from_mirror(spec, &project_dir).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to download {} from mirror site, fallback to use apache archive",
                    spec.project
                );
                self.fetch_from_archive(spec, &project_dir)
                    .await
                    .map_err(|source| FetchError::Download {
                        project: spec.project,
                        version: spec.version.clone(),
                        source: Box::new(source),
                    })
            }
        }
    }

    async fn fetch_from_mirror(&self, spec: &ArchiveSpec, project_dir: &Path) -> FetchResult<()> {
        let mirror = self.mirrors.preferred_mirror().await?;
        let url = release_url(&mirror, spec)?;
        self.fetch_and_extract(&url, spec, project_dir).await
    }

    async fn fetch_from_archive(&self, spec: &ArchiveSpec, project_dir: &Path) -> FetchResult<()> {
        let url = release_url(&self.archive_base, spec)?;
        self.fetch_and_extract(&url, spec, project_dir).await
    }

    async fn fetch_and_extract(
        &self,
        url: &Url,
        spec: &ArchiveSpec,
        project_dir: &Path,
    ) -> FetchResult<()> {
        let archive = paths::archive_path(&self.cache_root, spec);
        remove_stale_archive(&archive).await?;

        info!("Downloading {} from {}", spec, url);
        let dir = project_dir.display().to_string();

        self.runner
            .run(&[
                "wget".to_string(),
                url.to_string(),
                "-P".to_string(),
                dir.clone(),
            ])
            .await?;

        // tar detects gzip from the content, so .tgz and .tar.gz both work
        self.runner
            .run(&[
                "tar".to_string(),
                "-xvf".to_string(),
                archive.display().to_string(),
                "-C".to_string(),
                dir,
            ])
            .await
    }
}

/// `wget -P` never overwrites: a leftover archive from a failed attempt would
/// make it save `<name>.1` and leave the broken file where `tar` looks.
async fn remove_stale_archive(archive: &Path) -> FetchResult<()> {
    match tokio::fs::remove_file(archive).await {
        Ok(()) => {
            debug!("Removed stale archive {}", archive.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(FetchError::Io {
            path: archive.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dist::mirror::StaticMirror;
    use crate::dist::testing::RecordingRunner;
    use crate::dist::types::Project;
    use tempfile::TempDir;

    const MIRROR: &str = "https://mirror.example.org/apache/";
    const ARCHIVE: &str = "https://archive.apache.org/dist";

    fn fetcher(
        root: &Path,
        runner: Arc<RecordingRunner>,
        mirror: Option<&str>,
    ) -> ArchiveFetcher {
        let mirror = StaticMirror(mirror.map(|m| Url::parse(m).unwrap()));
        ArchiveFetcher::new(
            root.to_path_buf(),
            Url::parse(ARCHIVE).unwrap(),
            runner,
            Arc::new(mirror),
        )
    }

    fn spark_spec() -> ArchiveSpec {
        ArchiveSpec::new(Project::Spark, "3.4.1", "-bin-hadoop3.tgz")
    }

    #[tokio::test]
    async fn test_mirror_is_tried_first() {
        let temp = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::new());
        let root = temp.path();

        fetcher(root, runner.clone(), Some(MIRROR))
            .fetch(&spark_spec())
            .await
            .unwrap();

        let dir = root.join("spark");
        assert_eq!(
            runner.command_lines(),
            vec![
                format!(
                    "wget https://mirror.example.org/apache/spark/spark-3.4.1/spark-3.4.1-bin-hadoop3.tgz -P {}",
                    dir.display()
                ),
                format!(
                    "tar -xvf {} -C {}",
                    dir.join("spark-3.4.1-bin-hadoop3.tgz").display(),
                    dir.display()
                ),
            ]
        );
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_unreachable_mirror_falls_back_to_archive() {
        let temp = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::new());

        fetcher(temp.path(), runner.clone(), None)
            .fetch(&spark_spec())
            .await
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0][1],
            "https://archive.apache.org/dist/spark/spark-3.4.1/spark-3.4.1-bin-hadoop3.tgz"
        );
        assert_eq!(calls[1][0], "tar");
    }

    #[tokio::test]
    async fn test_failed_mirror_download_falls_back() {
        let temp = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::failing_when(|argv| {
            argv[0] == "wget" && argv[1].starts_with(MIRROR)
        }));

        fetcher(temp.path(), runner.clone(), Some(MIRROR))
            .fetch(&spark_spec())
            .await
            .unwrap();

        let calls = runner.calls();
        let programs: Vec<&str> = calls.iter().map(|argv| argv[0].as_str()).collect();
        assert_eq!(programs, vec!["wget", "wget", "tar"]);
        assert!(calls[1][1].starts_with(ARCHIVE));
    }

    #[tokio::test]
    async fn test_failed_extraction_falls_back() {
        let temp = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::failing_when({
            let seen_tar = std::sync::atomic::AtomicBool::new(false);
            move |argv| argv[0] == "tar" && !seen_tar.swap(true, std::sync::atomic::Ordering::SeqCst)
        }));

        fetcher(temp.path(), runner.clone(), Some(MIRROR))
            .fetch(&spark_spec())
            .await
            .unwrap();

        let programs: Vec<String> = runner.calls().iter().map(|argv| argv[0].clone()).collect();
        assert_eq!(programs, vec!["wget", "tar", "wget", "tar"]);
    }

    #[tokio::test]
    async fn test_both_paths_failing_is_fatal() {
        let temp = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::failing_when(|argv| argv[0] == "wget"));

        let err = fetcher(temp.path(), runner.clone(), Some(MIRROR))
            .fetch(&spark_spec())
            .await
            .unwrap_err();

        match err {
            FetchError::Download {
                project,
                version,
                source,
            } => {
                assert_eq!(project, Project::Spark);
                assert_eq!(version, "3.4.1");
                assert!(source.to_string().contains("archive.apache.org"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // one attempt per path, no extra retries
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_hadoop_uses_nested_remote_path() {
        let temp = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::new());
        let spec = ArchiveSpec::new(Project::Hadoop, "3.3.6", ".tar.gz");

        fetcher(temp.path(), runner.clone(), None)
            .fetch(&spec)
            .await
            .unwrap();

        assert_eq!(
            runner.calls()[0][1],
            "https://archive.apache.org/dist/hadoop/core/hadoop-3.3.6/hadoop-3.3.6.tar.gz"
        );
    }

    #[tokio::test]
    async fn test_stale_archive_is_removed_before_download() {
        let temp = TempDir::new().unwrap();
        let stale = temp.path().join("spark").join("spark-3.4.1-bin-hadoop3.tgz");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, b"truncated").unwrap();

        let runner = Arc::new(RecordingRunner::new());
        fetcher(temp.path(), runner, Some(MIRROR))
            .fetch(&spark_spec())
            .await
            .unwrap();

        assert!(!stale.exists());
    }
}
