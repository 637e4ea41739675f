//! External command execution for the fetch pipeline.
//!
//! Commands are spawned from a literal argument vector (no shell), and both
//! output pipes are drained concurrently so a chatty child such as `wget` or
//! `tar -v` never blocks on a full pipe buffer. Output is logged at most once
//! per throttle window per stream.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::types::{FetchError, FetchResult};

/// Default throttle window for subprocess output (5 seconds).
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(5);

// ============================================================================
// Runner Seam
// ============================================================================

/// Runs one external command to completion.
///
/// Implementations must treat a non-zero exit as an error.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, argv: &[String]) -> FetchResult<()>;
}

// ============================================================================
// Log Throttle
// ============================================================================

/// Lets through at most one event per interval.
///
/// The first event passes only once a full interval has elapsed since the
/// throttle was created.
#[derive(Debug, Clone)]
pub struct LogThrottle {
    interval: Duration,
    last: Instant,
}

impl LogThrottle {
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last: start,
        }
    }

    /// Returns true (and restarts the window) if `now` is past the window.
    pub fn should_log(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) > self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

// ============================================================================
// Shell Runner
// ============================================================================

/// Number of lines consumed from each output stream of a finished command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    pub stdout_lines: u64,
    pub stderr_lines: u64,
}

/// Spawns real processes via `tokio::process`.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    timeout: Option<Duration>,
    log_interval: Duration,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self {
            timeout: None,
            log_interval: DEFAULT_LOG_INTERVAL,
        }
    }
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill commands that run longer than `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_log_interval(mut self, log_interval: Duration) -> Self {
        self.log_interval = log_interval;
        self
    }

    /// Runs `argv` and waits for it, returning how much output was drained.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `argv` is empty.
    /// - The program cannot be spawned (e.g., not on `PATH`).
    /// - The process exits non-zero or is killed by a signal.
    /// - The configured timeout elapses (the process is killed).
    pub async fn execute(&self, argv: &[String]) -> FetchResult<DrainStats> {
        let (program, args) = argv.split_first().ok_or(FetchError::EmptyCommand)?;
        let command_line = argv.join(" ");

        info!("Starting shell command: {}", command_line);

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| FetchError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        let stdout_task = tokio::spawn(drain_lines(
            child.stdout.take(),
            "stdout",
            self.log_interval,
        ));
        let stderr_task = tokio::spawn(drain_lines(
            child.stderr.take(),
            "stderr",
            self.log_interval,
        ));

        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(waited) => waited,
                Err(_) => {
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill timed out command: {}", e);
                    }
                    stdout_task.abort();
                    stderr_task.abort();
                    return Err(FetchError::Timeout {
                        command: command_line,
                        timeout: limit,
                    });
                }
            },
            None => child.wait().await,
        };

        let status = waited.map_err(|e| FetchError::CommandFailed {
            command: command_line.clone(),
            status: e.to_string(),
        })?;

        let (stdout_lines, stderr_lines) = futures::future::join(stdout_task, stderr_task).await;
        let stats = DrainStats {
            stdout_lines: stdout_lines.unwrap_or_default(),
            stderr_lines: stderr_lines.unwrap_or_default(),
        };
        debug!(
            stdout_lines = stats.stdout_lines,
            stderr_lines = stats.stderr_lines,
            "Drained command output"
        );

        if !status.success() {
            return Err(FetchError::CommandFailed {
                command: command_line,
                status: status.to_string(),
            });
        }

        info!("Completed shell command: {}", command_line);
        Ok(stats)
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, argv: &[String]) -> FetchResult<()> {
        self.execute(argv).await.map(|_| ())
    }
}

/// Reads a pipe to EOF, logging a throttled sample of its lines.
///
/// Lines are read as raw bytes so non-UTF-8 output cannot stop the drain.
async fn drain_lines<R>(reader: Option<R>, stream: &'static str, interval: Duration) -> u64
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return 0;
    };

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut throttle = LogThrottle::new(interval, Instant::now());
    let mut count = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                count += 1;
                if throttle.should_log(Instant::now()) {
                    let line = String::from_utf8_lossy(&buf);
                    info!(stream, "{}", line.trim_end());
                }
            }
            Err(e) => {
                warn!(stream, "Fail to read shell output: {}", e);
                break;
            }
        }
    }

    count
}
