//! Test doubles for the fetch pipeline.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use super::runner::{CommandRunner, ShellRunner};
use super::types::{FetchError, FetchResult};

type FailPredicate = Box<dyn Fn(&[String]) -> bool + Send + Sync>;

/// Records every command and pretends it succeeded, unless told to fail.
pub struct RecordingRunner {
    calls: Mutex<Vec<Vec<String>>>,
    fail_when: FailPredicate,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::failing_when(|_| false)
    }

    pub fn failing_when<F>(predicate: F) -> Self
    where
        F: Fn(&[String]) -> bool + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_when: Box::new(predicate),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls rendered as space-joined command lines.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|argv| argv.join(" ")).collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, argv: &[String]) -> FetchResult<()> {
        self.calls.lock().unwrap().push(argv.to_vec());
        if (self.fail_when)(argv) {
            return Err(FetchError::CommandFailed {
                command: argv.join(" "),
                status: "exit status: 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Serves `wget` from local fixture files and runs everything else for real.
///
/// A `wget <url> -P <dir>` call copies the fixture registered for `<url>` to
/// `<dir>/<last url segment>`; unknown URLs fail like an HTTP 404.
pub struct FixtureRunner {
    fixtures: HashMap<String, PathBuf>,
    shell: ShellRunner,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FixtureRunner {
    pub fn new() -> Self {
        Self {
            fixtures: HashMap::new(),
            shell: ShellRunner::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn serve(mut self, url: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        self.fixtures.insert(url.into(), file.into());
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FixtureRunner {
    async fn run(&self, argv: &[String]) -> FetchResult<()> {
        self.calls.lock().unwrap().push(argv.to_vec());

        match argv {
            [program, url, flag, dir] if program == "wget" && flag == "-P" => {
                let fixture = self.fixtures.get(url).ok_or_else(|| FetchError::CommandFailed {
                    command: argv.join(" "),
                    status: "exit status: 8".to_string(),
                })?;
                let file_name = url.rsplit('/').next().unwrap_or("download");
                let dir = Path::new(dir);
                std::fs::create_dir_all(dir).unwrap();
                std::fs::copy(fixture, dir.join(file_name)).unwrap();
                Ok(())
            }
            _ => self.shell.run(argv).await,
        }
    }
}

/// Writes a gzip-compressed tarball containing `entries` (path, contents).
pub fn write_tgz(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_path(name).unwrap();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append(&header, *data).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap();
}
