mod config;
mod engine;
mod gitops;
mod humanize;
mod parse;
mod report;
mod schedule;
mod signal;
mod util;

use std::fs::OpenOptions;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::{Settings, DEFAULT_DIRECTORY, DEFAULT_INTERVAL, DEFAULT_MESSAGE};
use crate::engine::{CheckResult, CommitEngine};
use crate::gitops::{GitCli, GitError};
use crate::parse::{CollectStrategy, CommitSummary, RepositoryStatus};
use crate::report::ReportError;
use crate::schedule::Scheduler;

const TESTED_GIT_VERSION: &str = "2.35.1";

#[derive(Parser)]
#[command(name = "autocommit", version, about = "Commit and push a git working tree on a timer")]
struct Cli {
    /// Keep earlier output instead of clearing the terminal on each refresh
    #[arg(short, long)]
    persist: bool,
    /// Git directory to manage
    #[arg(short, long, value_name = "path", default_value = DEFAULT_DIRECTORY)]
    directory: PathBuf,
    /// Check interval as <quantity><unit>, unit m (minutes) or h (hours).
    /// Must be at least 5 minutes, e.g. 3h
    #[arg(short, long, value_name = "time", default_value = DEFAULT_INTERVAL)]
    interval: String,
    /// Commit message
    #[arg(short, long, value_name = "message", default_value = DEFAULT_MESSAGE)]
    message: String,
    /// Print one JSON object per check instead of the status banner
    #[arg(long)]
    json: bool,
    /// Append logs to this file
    #[arg(long, value_name = "path")]
    log_file: Option<PathBuf>,
}

#[derive(Serialize)]
struct CycleReport<'a> {
    checked_at: String,
    result: &'a CheckResult,
    branch: Option<BranchState>,
    latest_commit: Option<&'a CommitSummary>,
}

/// Branch state read after the cycle, so a failed push still shows as diverged.
#[derive(Serialize)]
struct BranchState {
    name: String,
    sync_state: String,
    diverged: bool,
    has_changes: bool,
}

impl From<RepositoryStatus> for BranchState {
    fn from(st: RepositoryStatus) -> Self {
        Self {
            name: st.branch,
            sync_state: st.sync_state,
            diverged: st.has_diverged,
            has_changes: st.has_changes,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_deref()) {
        eprintln!("log: {e}");
        std::process::exit(1);
    }

    let settings = match Settings::new(&cli.directory, &cli.interval, &cli.message) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("\n  Error: {e}\n");
            let _ = Cli::command().print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = signal::install() { tracing::warn!("no Ctrl-C handler: {e}"); }

    run(&cli, &settings);
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    // Without a log file stay quiet unless RUST_LOG asks otherwise; stdout
    // belongs to the banner.
    let filter = |default: &str| {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter("info"))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter("off"))
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn run(cli: &Cli, settings: &Settings) {
    let engine = CommitEngine::new(GitCli::new(&settings.directory), settings.message.clone());
    tracing::info!(
        interval = %settings.interval,
        "autocommit running on {}", settings.directory.display()
    );

    if !cli.json { print_header(); }

    let every = settings.interval.as_duration();
    let mut scheduler = Scheduler::new(every, || cycle(cli, settings, &engine));
    let runs = scheduler.run(signal::flag());

    if !cli.json { println!("autocommit stopped."); }
    tracing::info!(runs, "stopped");
}

fn cycle(cli: &Cli, settings: &Settings, engine: &CommitEngine<GitCli>) -> ControlFlow<()> {
    if !cli.json { print_details(cli.persist, settings); }

    let result = match engine.check_and_commit() {
        Ok(r) => r,
        Err(e) => {
            tracing::info!("{e}");
            return ControlFlow::Break(());
        }
    };
    for line in &result.debug { tracing::info!("{line}"); }

    let latest = match report::latest_commit(engine.git(), chrono::Utc::now()) {
        Ok(c) => c,
        Err(ReportError::Git(GitError::Interrupted(_))) => return ControlFlow::Break(()),
        Err(e) => {
            tracing::error!("{e}");
            if !cli.json { eprintln!("{e}"); }
            None
        }
    };

    if cli.json {
        let branch = match engine.status(CollectStrategy::Latest) {
            Ok(st) => Some(BranchState::from(st)),
            Err(GitError::Interrupted(_)) => return ControlFlow::Break(()),
            Err(e) => {
                tracing::error!("{e}");
                None
            }
        };
        print_json(&result, branch, latest.as_ref());
    } else {
        print_result(&result, latest.as_ref());
    }
    ControlFlow::Continue(())
}

fn print_header() {
    println!("NOTE:\tautocommit was tested with git version {TESTED_GIT_VERSION}\n");
    println!("{:_<60}", "autocommit - Automatic git commit ");
}

fn print_details(persist: bool, settings: &Settings) {
    if !persist {
        // clear screen, cursor home
        print!("\x1B[2J\x1B[1;1H");
        print_header();
    }

    let rows = [
        ("Git Directory: ", settings.directory.display().to_string()),
        ("Repo Check Interval: ", settings.interval.to_string()),
        ("Last Repo Check: ", util::stamp(util::now_local())),
        ("Configured Commit Message: ", format!("\"{}\"", settings.message)),
    ];
    for (label, value) in rows {
        println!("{label:-<40} {value}");
    }
    println!();
}

fn print_result(result: &CheckResult, latest: Option<&CommitSummary>) {
    if let Some(fault) = &result.fault { eprintln!("\ncheck_and_commit: {fault}"); }

    println!("  {}", result.debug.first().map(String::as_str).unwrap_or(""));
    if let Some(push) = result.debug.get(1) { println!("  {push}"); }
    println!("  {}\n", report::format_summary(latest));
}

fn print_json(result: &CheckResult, branch: Option<BranchState>, latest: Option<&CommitSummary>) {
    let report = CycleReport {
        checked_at: util::iso(util::now_utc()),
        result,
        branch,
        latest_commit: latest,
    };
    match serde_json::to_string(&report) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::error!("json: {e}"),
    }
}
