use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::gitops::{Git, GitError};
use crate::parse::{self, CollectStrategy, RepositoryStatus};

/// Push text when the commit changed nothing and push was skipped.
pub const PUSH_SKIPPED: &str = "unsuccessful";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    CommitAttempted,
    NotNeeded,
}

impl CheckStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::CommitAttempted => "Commit attempted",
            Self::NotNeeded => "Commit not needed, Repo left alone.",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl Serialize for CheckStatus {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.label())
    }
}

/// Outcome of one check cycle.
///
/// `success` only says the engine did not blow up; whether the commit or push
/// worked is in `debug`. `fault` carries the error that cut the cycle short.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub success: bool,
    pub status: CheckStatus,
    pub debug: Vec<String>,
    pub fault: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitAttempt {
    pub commit_text: String,
    pub push_text: String,
    pub pushed: bool,
}

#[derive(Debug, Error)]
#[error("interrupted while running git {0}")]
pub struct Interrupted(pub String);

pub struct CommitEngine<G> {
    git: G,
    message: String,
}

impl<G: Git> CommitEngine<G> {
    pub fn new(git: G, message: impl Into<String>) -> Self {
        Self { git, message: message.into() }
    }

    pub fn git(&self) -> &G { &self.git }

    /// `Latest` only needs the branch summary, so `git status --porcelain` is skipped.
    pub fn status(&self, strategy: CollectStrategy) -> Result<RepositoryStatus, GitError> {
        let status = self.git.run(&["status"])?.stdout_text();
        let porcelain = match strategy {
            CollectStrategy::Changed => self.git.run(&["status", "--porcelain"])?.stdout_text(),
            CollectStrategy::Latest => String::new(),
        };
        Ok(parse::parse_status(&status, &porcelain, strategy))
    }

    /// `git commit -am <message>`, then `git push` if the commit output shows
    /// it recorded something. The exit status of either command is not looked at.
    pub fn auto_commit(&self) -> Result<CommitAttempt, GitError> {
        let commit = self.git.run(&["commit", "-am", self.message.as_str()])?;
        let commit_text = parse::one_line(&commit.stdout_text());
        tracing::debug!(exit_code = ?commit.exit_code, "git commit finished");

        if !parse::commit_made_changes(&commit_text) {
            tracing::warn!("commit recorded nothing, skipping push: {commit_text}");
            return Ok(CommitAttempt {
                commit_text,
                push_text: PUSH_SKIPPED.to_string(),
                pushed: false,
            });
        }

        let push = self.git.run(&["push"])?;
        Ok(CommitAttempt {
            commit_text,
            push_text: parse::one_line(&push.stderr_text()),
            pushed: true,
        })
    }

    /// Inspect the working tree and commit + push when it has changes.
    ///
    /// Git failures are logged and land in [`CheckResult::fault`]; only an
    /// operator interrupt comes back as an error.
    pub fn check_and_commit(&self) -> Result<CheckResult, Interrupted> {
        let mut result = CheckResult {
            success: true,
            status: CheckStatus::NotNeeded,
            debug: Vec::new(),
            fault: None,
        };

        match self.cycle(&mut result) {
            Ok(()) => {}
            Err(GitError::Interrupted(cmd)) => return Err(Interrupted(cmd)),
            Err(e) => {
                tracing::error!("check_and_commit: {e}");
                result.fault = Some(e.to_string());
            }
        }
        Ok(result)
    }

    fn cycle(&self, result: &mut CheckResult) -> Result<(), GitError> {
        let st = self.status(CollectStrategy::Changed)?;
        for f in st.modified.iter().chain(&st.untracked) {
            tracing::debug!("{} {} ({})", f.short_code, f.path, f.kind.describe());
        }

        if st.needs_commit() {
            tracing::info!(
                branch = %st.branch,
                modified = st.modified.len(),
                untracked = st.untracked.len(),
                "committing changes with message {:?}", self.message
            );
            let attempt = self.auto_commit()?;
            tracing::info!(pushed = attempt.pushed, "commit attempted");
            result.status = CheckStatus::CommitAttempted;
            result.debug.push(attempt.commit_text);
            result.debug.push(attempt.push_text);
        } else {
            if st.has_diverged {
                tracing::info!(branch = %st.branch, "no local changes but {}", st.sync_state);
            }
            result.debug.push(format!(
                "Checked Git Repo {} state: {}",
                self.git.workdir().display(),
                result.status
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitops::fake::FakeGit;

    const CLEAN: &str = "On branch main\nYour branch is up to date with 'origin/main'.\n\nnothing to commit, working tree clean\n";
    const DIRTY: &str = "On branch main\nYour branch is up to date with 'origin/main'.\n\nChanges not staged for commit:\n";

    fn dirty() -> FakeGit {
        FakeGit::new()
            .stdout("status", DIRTY)
            .stdout("status --porcelain", " M src/main.rs\n?? notes.txt\n")
    }

    fn spawn_err(cmd: &str) -> GitError {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "no git");
        GitError::Spawn { args: cmd.into(), source }
    }

    #[test]
    fn clean_tree_is_left_alone() {
        let git = FakeGit::new().stdout("status", CLEAN).stdout("status --porcelain", "");
        let engine = CommitEngine::new(git, "auto-commit");
        let r = engine.check_and_commit().unwrap();

        assert!(r.success);
        assert_eq!(r.status.label(), "Commit not needed, Repo left alone.");
        assert_eq!(
            r.debug,
            vec!["Checked Git Repo /repo state: Commit not needed, Repo left alone.".to_string()]
        );
        assert!(r.fault.is_none());
        assert!(!engine.git().ran("commit -am auto-commit"));
    }

    #[test]
    fn diverged_but_clean_tree_is_not_committed() {
        let status = "On branch main\nYour branch is ahead of 'origin/main' by 1 commit.\n\nnothing to commit, working tree clean\n";
        let git = FakeGit::new().stdout("status", status).stdout("status --porcelain", "");
        let engine = CommitEngine::new(git, "auto-commit");
        let r = engine.check_and_commit().unwrap();
        assert_eq!(r.status, CheckStatus::NotNeeded);
        assert_eq!(r.debug.len(), 1);
    }

    #[test]
    fn commit_then_push() {
        let git = dirty()
            .stdout("commit -am wip", "[main 3f2a9c1] wip\n 2 files changed, 3 insertions(+)\n create mode 100644 notes.txt\n")
            .stderr("push", "To github.com:me/repo.git\n   0a1b2c3..3f2a9c1  main -> main\n");
        let engine = CommitEngine::new(git, "wip");
        let r = engine.check_and_commit().unwrap();

        assert_eq!(r.status.label(), "Commit attempted");
        assert_eq!(r.debug.len(), 2);
        assert!(r.debug[0].starts_with("[main 3f2a9c1] wip  2 files changed"));
        assert_eq!(r.debug[1], "To github.com:me/repo.git    0a1b2c3..3f2a9c1  main -> main ");
        assert!(engine.git().ran("push"));
    }

    #[test]
    fn no_op_commit_skips_push() {
        let nothing = "On branch main\nnothing added to commit but untracked files present\n";
        let git = dirty().stdout("commit -am auto-commit", nothing);
        let engine = CommitEngine::new(git, "auto-commit");

        let attempt = engine.auto_commit().unwrap();
        assert!(!attempt.pushed);
        assert_eq!(attempt.push_text, PUSH_SKIPPED);

        let r = engine.check_and_commit().unwrap();
        assert_eq!(r.status, CheckStatus::CommitAttempted);
        assert_eq!(r.debug[1], "unsuccessful");
        assert!(!engine.git().ran("push"));
    }

    #[test]
    fn git_failure_is_contained() {
        let git = FakeGit::new().fail("status", spawn_err("status"));
        let engine = CommitEngine::new(git, "auto-commit");
        let r = engine.check_and_commit().unwrap();

        assert!(r.success);
        assert_eq!(r.status, CheckStatus::NotNeeded);
        assert!(r.debug.is_empty());
        assert!(r.fault.unwrap().contains("failed to run git status"));
    }

    #[test]
    fn failed_push_keeps_commit_state() {
        let git = dirty()
            .stdout("commit -am auto-commit", " 1 file changed, 1 deletion(-)\n")
            .fail("push", spawn_err("push"));
        let engine = CommitEngine::new(git, "auto-commit");
        let r = engine.check_and_commit().unwrap();

        assert_eq!(r.status, CheckStatus::NotNeeded);
        assert!(r.debug.is_empty());
        assert!(r.fault.is_some());
    }

    #[test]
    fn interrupt_propagates() {
        let git = dirty()
            .stdout("commit -am auto-commit", " 1 file changed\n")
            .fail("push", GitError::Interrupted("push".into()));
        let engine = CommitEngine::new(git, "auto-commit");
        let err = engine.check_and_commit().unwrap_err();
        assert_eq!(err.0, "push");
    }

    #[test]
    fn branch_summary_skips_porcelain() {
        let engine = CommitEngine::new(dirty(), "auto-commit");
        let st = engine.status(CollectStrategy::Latest).unwrap();

        assert_eq!(st.branch, "main");
        assert!(st.has_changes);
        assert!(engine.git().ran("status"));
        assert!(!engine.git().ran("status --porcelain"));
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_string(&CheckStatus::CommitAttempted).unwrap();
        assert_eq!(json, "\"Commit attempted\"");
    }
}
