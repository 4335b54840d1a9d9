//! Command entry points (fresh copy, retry, status)

pub mod copy;
pub mod retry;
pub mod status;

use crate::config::RunMode;
use crate::executor::SessionEvent;
use crate::report::{SessionReport, StatusReport};
use crate::types::CopyError;
use crate::ui::ProgressReporter;
use crate::Config;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Result of any command, ready for printing.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RunReport {
    Session(SessionReport),
    Status(StatusReport),
}

/// Dispatch on the configured mode.
pub fn run(config: Config) -> Result<RunReport, CopyError> {
    match config.mode {
        RunMode::Fresh => copy::run(&config).map(RunReport::Session),
        RunMode::Retry => retry::run(&config).map(RunReport::Session),
        RunMode::Status => status::run(&config).map(RunReport::Status),
    }
}

pub(crate) type SharedReporter = Arc<Mutex<ProgressReporter>>;

pub(crate) fn reporter_for(config: &Config) -> SharedReporter {
    let reporter = if config.quiet || config.json {
        ProgressReporter::hidden()
    } else {
        ProgressReporter::new()
    };
    Arc::new(Mutex::new(reporter))
}

/// Forward engine events to the progress display.
pub(crate) fn progress_callback(
    reporter: &SharedReporter,
) -> impl Fn(&SessionEvent<'_>) + Send + Sync {
    let reporter = Arc::clone(reporter);
    move |event: &SessionEvent<'_>| match event {
        SessionEvent::FileStart { index, total, path } => {
            if let Ok(progress) = reporter.lock() {
                progress.set_current_file(*index, *total, path);
            }
        }
        SessionEvent::FileSuccess { bytes, .. } => {
            if let Ok(mut progress) = reporter.lock() {
                progress.complete_file(*bytes);
            }
        }
        SessionEvent::FileError {
            path,
            kind,
            message,
            ..
        } => {
            if let Ok(progress) = reporter.lock() {
                progress.file_error(path, &format!("{}: {}", kind, message));
            }
        }
        SessionEvent::Complete { result } => {
            if let Ok(progress) = reporter.lock() {
                progress.finish_transfer(result.copied, result.failures.len());
            }
        }
    }
}

/// Paths discovery must never return: the ledgers and the error log's
/// temporary rewrite file, in case the destination sits inside the source.
pub(crate) fn ledger_paths(config: &Config) -> Vec<PathBuf> {
    let error_log = config.error_log_path();
    vec![
        config.progress_log_path(),
        error_log.with_extension("part"),
        error_log,
    ]
}

pub(crate) fn print_header(config: &Config) {
    if !config.json {
        println!(
            "{}",
            crate::report::format_header(config.mode, &config.source, &config.destination)
        );
    }
}
