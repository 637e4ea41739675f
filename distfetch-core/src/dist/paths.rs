//! Cache path layout for downloaded distributions.
//!
//! Every project gets one flat folder under the cache root, and each release
//! unpacks into its own directory inside it:
//!
//! - `{cache}/spark/spark-{version}-bin-hadoop{hadoop}/`
//! - `{cache}/flink/flink-{version}/`
//! - `{cache}/hadoop/hadoop-{version}/`
//!
//! The archives are downloaded next to the extracted directories and kept.

use std::path::{Path, PathBuf};

use super::types::{ArchiveSpec, FetchError, FetchResult, Project};

// ============================================================================
// Path Resolution
// ============================================================================

/// Returns the download folder for a project.
///
/// Path: `{cache}/{project}/`
pub fn project_dir(cache_root: &Path, project: Project) -> PathBuf {
    cache_root.join(project.as_str())
}

/// Returns where an archive lands after `wget -P {project_dir}`.
///
/// Path: `{cache}/{project}/{project}-{version}{suffix}`
pub fn archive_path(cache_root: &Path, spec: &ArchiveSpec) -> PathBuf {
    project_dir(cache_root, spec.project).join(spec.file_name())
}

/// Path: `{cache}/spark/spark-{version}-bin-hadoop{hadoop}/`
pub fn spark_home(cache_root: &Path, spark_version: &str, hadoop_version: &str) -> PathBuf {
    project_dir(cache_root, Project::Spark).join(format!(
        "spark-{}-bin-hadoop{}",
        spark_version, hadoop_version
    ))
}

/// Path: `{cache}/flink/flink-{version}/`
pub fn flink_home(cache_root: &Path, flink_version: &str) -> PathBuf {
    project_dir(cache_root, Project::Flink).join(format!("flink-{}", flink_version))
}

/// Path: `{cache}/hadoop/hadoop-{version}/`
pub fn hadoop_home(cache_root: &Path, hadoop_version: &str) -> PathBuf {
    project_dir(cache_root, Project::Hadoop).join(format!("hadoop-{}", hadoop_version))
}

/// Creates a directory and all missing parents. Succeeds if it already exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created (e.g., permission issues).
pub async fn ensure_dir(dir: &Path) -> FetchResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| FetchError::Io {
            path: dir.to_path_buf(),
            source,
        })
}

/// Makes a path absolute against the current directory without touching the
/// filesystem.
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
