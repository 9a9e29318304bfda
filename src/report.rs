use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::gitops::{Git, GitError};
use crate::humanize::humanize;
use crate::parse::{parse_latest_commit, CommitSummary, LogParseError};

pub const NO_COMMITS: &str = "Current branch does not have any commits yet";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Git(#[from] GitError),
    #[error("reading latest commit: {0}")]
    Log(#[from] LogParseError),
}

/// Newest commit on the current branch, `None` when it has none.
pub fn latest_commit(
    git: &impl Git,
    now: DateTime<Utc>,
) -> Result<Option<CommitSummary>, ReportError> {
    // On an unborn branch git prints to stderr only, leaving stdout empty.
    let log = git.run(&["log", "-1"])?.stdout_text();
    Ok(parse_latest_commit(&log, now)?)
}

pub fn format_summary(summary: Option<&CommitSummary>) -> String {
    let Some(c) = summary else { return NO_COMMITS.to_string() };
    let (count, unit) = humanize(c.age);
    format!(
        "Latest {count} {unit} ago by {} ({}) {}: {}",
        c.author,
        c.timestamp.format("%m/%d/%Y %H:%M"),
        c.short_hash,
        c.message
    )
}
