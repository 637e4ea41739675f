//! Pinned runtime additions for Flink distributions.
//!
//! The stock Flink binary distribution lacks the jars needed to run against
//! Hive and YARN, and newer releases ship the table planner and SQL client in
//! `opt/`. This module lists the fixed set of downloads and relocations that
//! turn a freshly extracted Flink home into the layout integration tests use.

use std::path::{Path, PathBuf};

use url::Url;

use super::types::FetchResult;
use super::urls::maven_jar_url;
use super::version::SemanticVersion;

/// First Flink release whose SQL client jar must be moved from `opt` to `lib`.
pub const SQL_CLIENT_IN_LIB_SINCE: SemanticVersion = SemanticVersion::new(1, 16, 0);

// ============================================================================
// Jar Definitions
// ============================================================================

/// Which version a pinned jar is fetched at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JarVersion {
    /// Same version as the Flink distribution.
    Flink,
    /// A fixed version independent of Flink.
    Pinned(&'static str),
}

/// A Maven jar added to `<flink home>/lib`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JarDefinition {
    pub group_id: &'static str,
    /// Artifact id without any Scala binary suffix.
    pub artifact: &'static str,
    /// Whether the artifact id carries a `_<scala version>` suffix.
    pub scala_suffixed: bool,
    pub version: JarVersion,
}

impl JarDefinition {
    const fn flink(artifact: &'static str) -> Self {
        Self {
            group_id: "org.apache.flink",
            artifact,
            scala_suffixed: true,
            version: JarVersion::Flink,
        }
    }

    const fn pinned(group_id: &'static str, artifact: &'static str, version: &'static str) -> Self {
        Self {
            group_id,
            artifact,
            scala_suffixed: false,
            version: JarVersion::Pinned(version),
        }
    }

    pub fn artifact_id(&self, scala_version: &str) -> String {
        if self.scala_suffixed {
            format!("{}_{}", self.artifact, scala_version)
        } else {
            self.artifact.to_string()
        }
    }

    pub fn version<'a>(&self, flink_version: &'a str) -> &'a str {
        match self.version {
            JarVersion::Flink => flink_version,
            JarVersion::Pinned(v) => v,
        }
    }

    pub fn url(&self, repository: &Url, flink_version: &str, scala_version: &str) -> FetchResult<Url> {
        maven_jar_url(
            repository,
            self.group_id,
            &self.artifact_id(scala_version),
            self.version(flink_version),
        )
    }
}

/// Jars for running Flink with Hive and YARN, in download order.
pub const FLINK_EXTRA_JARS: &[JarDefinition] = &[
    JarDefinition::flink("flink-connector-hive"),
    JarDefinition::flink("flink-hadoop-compatibility"),
    JarDefinition::pinned("org.apache.hive", "hive-exec", "2.3.7"),
    JarDefinition::pinned("org.apache.hadoop", "hadoop-client-api", "3.3.6"),
    JarDefinition::pinned("org.apache.hadoop", "hadoop-client-runtime", "3.3.6"),
    JarDefinition::flink("flink-table-api-scala"),
    JarDefinition::flink("flink-table-api-scala-bridge"),
];

// ============================================================================
// Setup Steps
// ============================================================================

/// One command of the post-extraction Flink setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStep {
    /// `wget <url> -P <dest_dir>`
    Download { url: Url, dest_dir: PathBuf },
    /// `mv <from> <to_dir>`
    Move { from: PathBuf, to_dir: PathBuf },
}

impl SetupStep {
    pub fn argv(&self) -> Vec<String> {
        match self {
            Self::Download { url, dest_dir } => vec![
                "wget".to_string(),
                url.to_string(),
                "-P".to_string(),
                dest_dir.display().to_string(),
            ],
            Self::Move { from, to_dir } => vec![
                "mv".to_string(),
                from.display().to_string(),
                to_dir.display().to_string(),
            ],
        }
    }
}

/// Builds the ordered setup for an extracted Flink home.
///
/// Jar downloads come first, then the planner swap between `opt` and `lib`,
/// then (for 1.16.0 and later) the SQL client move.
pub fn flink_setup_steps(
    flink_home: &Path,
    flink_version: &str,
    scala_version: &str,
    repository: &Url,
) -> FetchResult<Vec<SetupStep>> {
    let lib = flink_home.join("lib");
    let opt = flink_home.join("opt");

    let mut steps = FLINK_EXTRA_JARS
        .iter()
        .map(|jar| -> FetchResult<SetupStep> {
            Ok(SetupStep::Download {
                url: jar.url(repository, flink_version, scala_version)?,
                dest_dir: lib.clone(),
            })
        })
        .collect::<FetchResult<Vec<_>>>()?;

    steps.push(SetupStep::Move {
        from: opt.join(format!(
            "flink-table-planner_{}-{}.jar",
            scala_version, flink_version
        )),
        to_dir: lib.clone(),
    });
    steps.push(SetupStep::Move {
        from: lib.join(format!("flink-table-planner-loader-{}.jar", flink_version)),
        to_dir: opt.clone(),
    });

    if SemanticVersion::parse(flink_version)?.is_at_least(&SQL_CLIENT_IN_LIB_SINCE) {
        steps.push(SetupStep::Move {
            from: opt.join(format!("flink-sql-client-{}.jar", flink_version)),
            to_dir: lib,
        });
    }

    Ok(steps)
}
