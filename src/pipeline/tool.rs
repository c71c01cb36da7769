//! Subprocess plumbing: a private temp workspace and a tool runner.
//!
//! pdftk and ImageMagick read and write files, so every operation gets its
//! own [`Workspace`] (a `TempDir`) that is removed when it is dropped, even
//! if the caller's future is cancelled halfway through. Spawned children are
//! created with `kill_on_drop` for the same reason.

use crate::error::MassageError;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

/// Largest chunk of stderr carried into an error message.
const STDERR_LIMIT: usize = 2000;

/// A temporary directory holding the files of one operation.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a workspace under `parent`, or the system temp dir.
    pub fn new(parent: Option<&Path>) -> Result<Self, MassageError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("massage-");
        let dir = match parent {
            Some(p) => builder.tempdir_in(p),
            None => builder.tempdir(),
        }
        .map_err(|e| MassageError::workspace(parent.unwrap_or(Path::new("<tmp>")), e))?;
        debug!("Workspace created: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `name` inside the workspace.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `bytes` to `name` and return its path.
    pub async fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, MassageError> {
        let path = self.path(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| MassageError::workspace(&path, e))?;
        Ok(path)
    }

    /// Read `name` back from the workspace.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, MassageError> {
        let path = self.path(name);
        tokio::fs::read(&path)
            .await
            .map_err(|e| MassageError::workspace(&path, e))
    }

    /// Read every file whose name starts with `prefix` and ends with
    /// `suffix`, sorted by file name.
    pub async fn read_matching(
        &self,
        prefix: &str,
        suffix: &str,
    ) -> Result<Vec<Vec<u8>>, MassageError> {
        let root = self.root();
        let mut entries = tokio::fs::read_dir(root)
            .await
            .map_err(|e| MassageError::workspace(root, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| MassageError::workspace(root, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(prefix) && name.ends_with(suffix) {
                names.push(name);
            }
        }
        names.sort();

        futures::future::try_join_all(names.iter().map(|n| self.read(n))).await
    }
}

/// A single external tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    timeout: Duration,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the tool from `dir`. pdftk drops side files into its working
    /// directory, so this should point into the workspace.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn get_program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Short display name for logs and errors (`pdftk`, `convert`, `gm`).
    pub fn name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Run the tool to completion and return its stdout.
    pub async fn run(&self) -> Result<Vec<u8>, MassageError> {
        let name = self.name();
        debug!(
            "Running {} {}",
            self.program.display(),
            self.args
                .iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let start = Instant::now();
        let mut command = Command::new(&self.program);
        if let Some(ref dir) = self.current_dir {
            command.current_dir(dir);
        }
        let child = command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    MassageError::ToolNotFound { tool: name.clone() }
                }
                _ => MassageError::Internal(format!("failed to spawn {name}: {e}")),
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| MassageError::Internal(format!("{name}: {e}")))?,
            Err(_) => {
                warn!("{} exceeded {}s, killed", name, self.timeout.as_secs());
                return Err(MassageError::ToolTimeout {
                    tool: name,
                    secs: self.timeout.as_secs(),
                });
            }
        };

        debug!(
            "{} exited with {} in {}ms",
            name,
            output.status,
            start.elapsed().as_millis()
        );

        if !output.status.success() {
            return Err(MassageError::ToolFailed {
                tool: name,
                code: output
                    .status
                    .code()
                    .map_or_else(|| "signal".to_string(), |c| c.to_string()),
                stderr: truncate(String::from_utf8_lossy(&output.stderr).trim()),
            });
        }

        Ok(output.stdout)
    }
}

fn truncate(s: &str) -> String {
    if s.len() <= STDERR_LIMIT {
        return s.to_string();
    }
    let mut end = STDERR_LIMIT;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\u{2026}", &s[..end])
}

/// Whether `program` can be spawned at all.
pub async fn is_available(program: &Path) -> bool {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .is_ok()
}
