//! Startup configuration: check interval, repository directory and commit message.
//!
//! Everything here is validated once before the scheduler starts and is
//! immutable afterwards.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_DIRECTORY: &str = "./";
pub const DEFAULT_INTERVAL: &str = "1h";
pub const DEFAULT_MESSAGE: &str = "auto-commit";

/// Shortest allowed interval in minutes; `git status` is too costly to poll faster.
const MIN_MINUTES: u64 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Time interval {0:?} is invalid. Check out -h for help.")]
    InvalidInterval(String),
    #[error("Time interval {0:?} is too low. Check out -h for help.")]
    IntervalTooLow(String),
    #[error("{} is not a valid directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("{} is not a valid git repository", .0.display())]
    NotAGitRepo(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Second,
    Minute,
    Hour,
}

impl Unit {
    fn from_char(c: char) -> Option<Self> {
        match c {
            's' => Some(Self::Second),
            'm' => Some(Self::Minute),
            'h' => Some(Self::Hour),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Self::Second => 's',
            Self::Minute => 'm',
            Self::Hour => 'h',
        }
    }

    fn seconds(self) -> u64 {
        match self {
            Self::Second => 1,
            Self::Minute => 60,
            Self::Hour => 3600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSpec {
    pub quantity: u64,
    pub unit: Unit,
}

impl IntervalSpec {
    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.quantity.saturating_mul(self.unit.seconds()))
    }
}

impl FromStr for IntervalSpec {
    type Err = ConfigError;

    /// `<quantity><s|m|h>`, e.g. `30m` or `2h`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidInterval(s.to_string());
        let last = s.chars().last().ok_or_else(invalid)?;
        let unit = Unit::from_char(last).ok_or_else(invalid)?;
        let quantity: u64 = s[..s.len() - last.len_utf8()].parse().map_err(|_| invalid())?;
        if quantity == 0 { return Err(invalid()); }

        if unit == Unit::Second || (unit == Unit::Minute && quantity < MIN_MINUTES) {
            return Err(ConfigError::IntervalTooLow(s.to_string()));
        }
        Ok(Self { quantity, unit })
    }
}

impl fmt::Display for IntervalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.quantity, self.unit.as_char())
    }
}

/// Absolute path of `path`, which must be a directory holding a `.git` directory.
pub fn resolve_repository(path: &Path) -> Result<PathBuf, ConfigError> {
    if !path.is_dir() { return Err(ConfigError::NotADirectory(path.to_path_buf())); }
    if !path.join(".git").is_dir() { return Err(ConfigError::NotAGitRepo(path.to_path_buf())); }
    std::path::absolute(path).map_err(|_| ConfigError::NotADirectory(path.to_path_buf()))
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub directory: PathBuf,
    pub interval: IntervalSpec,
    pub message: String,
}

impl Settings {
    pub fn new(directory: &Path, interval: &str, message: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            directory: resolve_repository(directory)?,
            interval: interval.parse()?,
            message: message.to_string(),
        })
    }
}
