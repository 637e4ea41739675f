//! Core types for distribution fetching.
//!
//! This module defines the project identifiers, the identity of a single
//! archive download, and the error type shared by the fetch pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use super::version::ParseVersionError;
use crate::config::ConfigError;

// ============================================================================
// Projects
// ============================================================================

/// Apache projects whose binary distributions can be cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Project {
    Spark,
    Flink,
    Hadoop,
}

impl Project {
    /// Returns all supported projects.
    pub fn all() -> &'static [Project] {
        &[Self::Spark, Self::Flink, Self::Hadoop]
    }

    /// Lowercase name, used for the cache subdirectory and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spark => "spark",
            Self::Flink => "flink",
            Self::Hadoop => "hadoop",
        }
    }

    /// Path of the project below the mirror or archive `dist` root.
    ///
    /// Hadoop releases live under `hadoop/core/`; everything else under its
    /// own name.
    pub fn remote_path(&self) -> &'static str {
        match self {
            Self::Hadoop => "hadoop/core",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Project {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spark" => Ok(Self::Spark),
            "flink" => Ok(Self::Flink),
            "hadoop" => Ok(Self::Hadoop),
            _ => Err(format!("Unknown project: {}", s)),
        }
    }
}

// ============================================================================
// Archive Identity
// ============================================================================

/// Identity of one distribution archive.
///
/// `(project, version, suffix)` fully determines both the remote location and
/// the local file name. Secondary versions (the Hadoop build of Spark, the
/// Scala build of Flink) are part of the suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSpec {
    pub project: Project,
    pub version: String,
    /// Everything after `<project>-<version>`, e.g. `-bin-hadoop3.tgz`.
    pub suffix: String,
    remote_path: Option<String>,
}

impl ArchiveSpec {
    pub fn new(project: Project, version: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            project,
            version: version.into(),
            suffix: suffix.into(),
            remote_path: None,
        }
    }

    /// Overrides the project's default remote path.
    pub fn with_remote_path(mut self, remote_path: impl Into<String>) -> Self {
        self.remote_path = Some(remote_path.into());
        self
    }

    /// Remote path segment(s), `/`-separated.
    pub fn remote_path(&self) -> &str {
        self.remote_path
            .as_deref()
            .unwrap_or_else(|| self.project.remote_path())
    }

    /// `<project>-<version>`, the release directory name on the server.
    pub fn release_name(&self) -> String {
        format!("{}-{}", self.project, self.version)
    }

    /// `<project>-<version><suffix>`, the archive file name.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.release_name(), self.suffix)
    }
}

impl fmt::Display for ArchiveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.project, self.version)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Filesystem error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot run an empty command")]
    EmptyCommand,

    #[error("Failed to spawn shell command: {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("Fail to run shell command: {command} ({status})")]
    CommandFailed { command: String, status: String },

    #[error("Shell command timed out after {timeout:?}: {command}")]
    Timeout { command: String, timeout: Duration },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mirror resolution failed: {0}")]
    Mirror(String),

    #[error("Fail to download {project} {version}: {source}")]
    Download {
        project: Project,
        version: String,
        source: Box<FetchError>,
    },

    #[error("Fail to download jar for flink {version}: {source}")]
    FlinkDependencies {
        version: String,
        source: Box<FetchError>,
    },

    #[error(transparent)]
    Version(#[from] ParseVersionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_as_str() {
        assert_eq!(Project::Spark.as_str(), "spark");
        assert_eq!(Project::Flink.as_str(), "flink");
        assert_eq!(Project::Hadoop.as_str(), "hadoop");
    }

    #[test]
    fn test_project_remote_path() {
        assert_eq!(Project::Spark.remote_path(), "spark");
        assert_eq!(Project::Flink.remote_path(), "flink");
        assert_eq!(Project::Hadoop.remote_path(), "hadoop/core");
    }

    #[test]
    fn test_project_from_str() {
        assert_eq!("spark".parse::<Project>().unwrap(), Project::Spark);
        assert_eq!("Flink".parse::<Project>().unwrap(), Project::Flink);
        assert_eq!("HADOOP".parse::<Project>().unwrap(), Project::Hadoop);
        assert!("kafka".parse::<Project>().is_err());
        assert_eq!(Project::all().len(), 3);
    }

    #[test]
    fn test_archive_spec_names() {
        let spec = ArchiveSpec::new(Project::Spark, "3.4.1", "-bin-hadoop3.tgz");
        assert_eq!(spec.release_name(), "spark-3.4.1");
        assert_eq!(spec.file_name(), "spark-3.4.1-bin-hadoop3.tgz");
        assert_eq!(spec.remote_path(), "spark");
        assert_eq!(spec.to_string(), "spark 3.4.1");
    }

    #[test]
    fn test_archive_spec_remote_path_override() {
        let spec = ArchiveSpec::new(Project::Spark, "3.4.1", ".tgz").with_remote_path("spark/old");
        assert_eq!(spec.remote_path(), "spark/old");

        let hadoop = ArchiveSpec::new(Project::Hadoop, "3.3.6", ".tar.gz");
        assert_eq!(hadoop.remote_path(), "hadoop/core");
    }

    #[test]
    fn test_download_error_message_names_artifact() {
        let err = FetchError::Download {
            project: Project::Hadoop,
            version: "3.3.6".to_string(),
            source: Box::new(FetchError::CommandFailed {
                command: "wget x".to_string(),
                status: "exit status: 8".to_string(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("hadoop 3.3.6"));
        assert!(msg.contains("wget x"));
    }
}
