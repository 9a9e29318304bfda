//! Readers for the human-oriented text git prints.
//!
//! Every substring and marker this crate relies on lives here, so switching a
//! query to a machine-readable format only touches this file.

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use serde::Serialize;
use thiserror::Error;

const UP_TO_DATE: &str = "Your branch is up to date";
const NOTHING_TO_COMMIT: &str = "nothing to commit";
const COMMIT_MARKERS: [&str; 3] = ["file changed", "insertion", "deletion"];
const LOG_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y %z";

/// Kind of change behind a porcelain status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    Modified,
    NewFile,
    Deleted,
    Renamed,
    Copied,
    Unmerged,
    Untracked,
}

impl ChangeKind {
    /// Maps the first character of a porcelain code (see git's wt-status.c).
    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'M' => Some(Self::Modified),
            'A' => Some(Self::NewFile),
            'D' => Some(Self::Deleted),
            'R' => Some(Self::Renamed),
            'C' => Some(Self::Copied),
            'U' => Some(Self::Unmerged),
            '?' => Some(Self::Untracked),
            _ => None,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Modified => "modified",
            Self::NewFile => "new file",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
            Self::Copied => "copied",
            Self::Unmerged => "unmerged",
            Self::Untracked => "untracked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub short_code: String,
    pub kind: ChangeKind,
    pub path: String,
}

/// How much of the porcelain listing to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectStrategy {
    /// Collect every changed and untracked file.
    Changed,
    /// Branch and change summary only.
    Latest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryStatus {
    pub branch: String,
    pub sync_state: String,
    pub has_diverged: bool,
    pub has_changes: bool,
    pub modified: Vec<FileChange>,
    pub untracked: Vec<FileChange>,
}

impl RepositoryStatus {
    pub fn needs_commit(&self) -> bool {
        !self.modified.is_empty() || !self.untracked.is_empty()
    }
}

/// Builds a [`RepositoryStatus`] from `git status` and `git status --porcelain`.
///
/// Porcelain lines with an unrecognised code are dropped.
pub fn parse_status(status: &str, porcelain: &str, strategy: CollectStrategy) -> RepositoryStatus {
    let mut st = RepositoryStatus::default();
    let mut lines = status.lines();
    let first = lines.next().unwrap_or("");
    let second = lines.next().unwrap_or("");

    if first.contains("branch") {
        st.branch = first.split_whitespace().nth(2).unwrap_or("").to_string();
    }
    if second.contains("branch") {
        st.sync_state = second.to_string();
        st.has_diverged = !second.contains(UP_TO_DATE);
    }
    st.has_changes = !status.contains(NOTHING_TO_COMMIT) || st.has_diverged;

    if strategy == CollectStrategy::Latest { return st; }

    for line in porcelain.lines().filter(|l| !l.trim().is_empty()) {
        match porcelain_entry(line) {
            Some(fc) if fc.kind == ChangeKind::Untracked => st.untracked.push(fc),
            Some(fc) => st.modified.push(fc),
            None => tracing::warn!("dropping unrecognised status line {line:?}"),
        }
    }
    st
}

fn porcelain_entry(line: &str) -> Option<FileChange> {
    let line = line.trim_start();
    let code = line.split_whitespace().next()?;
    let path = line[code.len()..].trim();
    if path.is_empty() { return None; }
    let kind = ChangeKind::from_code(code.chars().next()?)?;
    Some(FileChange { short_code: code.to_string(), kind, path: path.to_string() })
}

/// True when `git commit` output reports files, insertions or deletions.
/// Anything else (hook aborted, nothing staged) counts as no commit.
pub fn commit_made_changes(commit_text: &str) -> bool {
    COMMIT_MARKERS.iter().any(|m| commit_text.contains(m))
}

/// Folds multi-line command output onto one line.
pub fn one_line(text: &str) -> String {
    text.replace('\n', " ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitSummary {
    pub message: String,
    pub timestamp: DateTime<FixedOffset>,
    #[serde(serialize_with = "crate::util::ser_age_iso")]
    pub age: TimeDelta,
    pub author: String,
    pub short_hash: String,
}

#[derive(Debug, Error)]
pub enum LogParseError {
    #[error("log output does not start with a commit header: {0:?}")]
    MissingHeader(String),
    #[error("commit {0} has no Date: line")]
    MissingDate(String),
    #[error("unparseable commit date {date:?}: {source}")]
    BadDate { date: String, source: chrono::ParseError },
}

/// Reads the newest entry of `git log` output. Empty output means the branch
/// has no commits yet.
pub fn parse_latest_commit(
    log: &str,
    now: DateTime<Utc>,
) -> Result<Option<CommitSummary>, LogParseError> {
    if log.trim().is_empty() { return Ok(None); }

    let mut hash: Option<String> = None;
    let mut author = String::new();
    let mut date: Option<String> = None;
    let mut message = String::new();

    for line in log.lines() {
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else { continue };

        if line.starts_with("commit") {
            // only the head of the history is read
            if hash.is_some() { break; }
            hash = Some(tokens.next().unwrap_or("").chars().take(7).collect());
            continue;
        }
        let Some(h) = &hash else {
            return Err(LogParseError::MissingHeader(line.trim().to_string()));
        };

        if date.is_some() {
            message = line.trim().to_string();
            break;
        }
        match first {
            "Author:" => author = author_name(tokens),
            "Date:" => {
                let raw = line.split_once(':').map(|(_, d)| d.trim()).unwrap_or("");
                if raw.is_empty() { return Err(LogParseError::MissingDate(h.clone())); }
                date = Some(raw.to_string());
            }
            _ => {}
        }
    }

    let short_hash = hash.unwrap_or_default();
    let date = date.ok_or_else(|| LogParseError::MissingDate(short_hash.clone()))?;
    let timestamp = DateTime::parse_from_str(&date, LOG_DATE_FORMAT)
        .map_err(|source| LogParseError::BadDate { date: date.clone(), source })?;

    Ok(Some(CommitSummary {
        message,
        timestamp,
        age: now.signed_duration_since(timestamp),
        author,
        short_hash,
    }))
}

// "Author: Jane Doe <jane@example.com>" -> "Jane Doe"
fn author_name<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    let mut parts: Vec<&str> = tokens.collect();
    if parts.last().is_some_and(|t| t.starts_with('<') && t.ends_with('>')) {
        parts.pop();
    }
    parts.join(" ").trim().to_string()
}
