use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::signal;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git {args}: {source}")]
    Spawn { args: String, source: std::io::Error },
    #[error("interrupted while running git {0}")]
    Interrupted(String),
}

/// Raw result of one git invocation. Nothing upstream looks at `exit_code`;
/// decisions are made on the text.
#[derive(Debug, Clone, Default)]
pub struct GitOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i32>,
}

impl GitOutput {
    pub fn stdout_text(&self) -> String { String::from_utf8_lossy(&self.stdout).into_owned() }
    pub fn stderr_text(&self) -> String { String::from_utf8_lossy(&self.stderr).into_owned() }
}

pub trait Git {
    fn run(&self, args: &[&str]) -> Result<GitOutput, GitError>;

    /// Directory the commands run in.
    fn workdir(&self) -> &Path;
}

/// Runs the system `git` binary inside a repository.
///
/// Once `stop` is set no further git process is started.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo: PathBuf,
    stop: &'static AtomicBool,
}

impl GitCli {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into(), stop: signal::flag() }
    }

    pub fn with_stop(mut self, stop: &'static AtomicBool) -> Self {
        self.stop = stop;
        self
    }

    fn stopped(&self) -> bool { self.stop.load(Ordering::SeqCst) }
}

impl Git for GitCli {
    fn run(&self, args: &[&str]) -> Result<GitOutput, GitError> {
        let joined = args.join(" ");
        if self.stopped() { return Err(GitError::Interrupted(joined)); }
        tracing::debug!(repo = %self.repo.display(), "git {joined}");

        let out = Command::new("git")
            .args(args)
            .current_dir(&self.repo)
            .output()
            .map_err(|source| GitError::Spawn { args: joined.clone(), source })?;

        // git shares our process group, so a Ctrl-C kills it too; report that
        // instead of handing back a truncated output.
        if self.stopped() { return Err(GitError::Interrupted(joined)); }

        Ok(GitOutput {
            stdout: out.stdout,
            stderr: out.stderr,
            exit_code: out.status.code(),
        })
    }

    fn workdir(&self) -> &Path { &self.repo }
}
