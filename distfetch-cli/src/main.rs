//! distfetch command line
//!
//! Pre-warms the integration test distribution cache, e.g. in a CI setup
//! step. Prints the install directory of the requested distribution on
//! stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use distfetch_core::{DistCache, FetchConfig};

#[derive(Debug, Parser)]
#[command(name = "distfetch", version, about = "Download and cache Apache distributions for integration tests")]
struct Cli {
    /// JSON config file (defaults apply to missing fields)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache root, overriding the config file and DISTFETCH_CACHE_DIR
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Spark binary distribution built for a Hadoop version
    Spark {
        version: String,
        hadoop_version: String,
    },
    /// Flink binary distribution plus the Hive/YARN runtime jars
    Flink {
        version: String,
        scala_version: String,
    },
    /// Hadoop binary distribution
    Hadoop { version: String },
}

impl Cli {
    fn fetch_config(&self) -> Result<FetchConfig> {
        let config = match &self.config {
            Some(path) => FetchConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => FetchConfig::default(),
        };
        let mut config = config
            .with_env_overrides()
            .context("Invalid DISTFETCH_* environment override")?;

        if let Some(dir) = &self.cache_dir {
            config.cache_root = dir.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("distfetch_core=debug".parse()?)
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting distfetch v{}", distfetch_core::VERSION);

    let cli = Cli::parse();
    let config = cli.fetch_config()?;
    let cache = DistCache::new(&config).context("Failed to set up distribution cache")?;

    let home = match &cli.command {
        Command::Spark {
            version,
            hadoop_version,
        } => cache
            .download_spark(version, hadoop_version)
            .await
            .with_context(|| format!("Failed to download spark {}", version))?,
        Command::Flink {
            version,
            scala_version,
        } => cache
            .download_flink(version, scala_version)
            .await
            .with_context(|| format!("Failed to download flink {}", version))?,
        Command::Hadoop { version } => cache
            .download_hadoop(version)
            .await
            .with_context(|| format!("Failed to download hadoop {}", version))?,
    };

    println!("{}", home.display());
    Ok(())
}
