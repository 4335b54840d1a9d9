//! Session summaries handed back to the CLI layer

use crate::config::RunMode;
use crate::executor::SessionResult;
use crate::ledger::ErrorRecord;
use console::style;
use indicatif::HumanBytes;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Why a run did no copying at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleReason {
    /// The source tree contains no files
    NoFiles,
    /// Every discovered file is already in the progress log
    AllDone,
    /// Retry requested but the error log is empty or absent
    NoFailures,
}

impl IdleReason {
    pub fn describe(&self) -> &'static str {
        match self {
            IdleReason::NoFiles => "No files found in source.",
            IdleReason::AllDone => "All files already copied.",
            IdleReason::NoFailures => "No failed files to retry.",
        }
    }
}

/// Totals for one fresh or retry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub mode: RunMode,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Files found by discovery (fresh) or listed in the error log (retry)
    pub discovered: usize,
    /// Files left out because the progress log already has them
    pub skipped: usize,
    pub attempted: usize,
    pub copied: usize,
    pub failed: usize,
    pub bytes_copied: u64,
    /// Set when nothing was attempted
    pub idle: Option<IdleReason>,
    /// Error log location, only when failures remain
    pub error_log: Option<PathBuf>,
    pub failures: Vec<ErrorRecord>,
}

impl SessionReport {
    /// Report for a run that had nothing to do.
    pub fn idle(
        mode: RunMode,
        source: &Path,
        destination: &Path,
        discovered: usize,
        skipped: usize,
        reason: IdleReason,
    ) -> Self {
        Self {
            mode,
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            discovered,
            skipped,
            attempted: 0,
            copied: 0,
            failed: 0,
            bytes_copied: 0,
            idle: Some(reason),
            error_log: None,
            failures: Vec::new(),
        }
    }

    /// Report for a completed engine run.
    pub fn from_session(
        mode: RunMode,
        source: &Path,
        destination: &Path,
        discovered: usize,
        skipped: usize,
        result: SessionResult,
        error_log: &Path,
    ) -> Self {
        let failed = result.failures.len();
        Self {
            mode,
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            discovered,
            skipped,
            attempted: result.attempted,
            copied: result.copied,
            failed,
            bytes_copied: result.bytes_copied,
            idle: None,
            error_log: (failed > 0).then(|| error_log.to_path_buf()),
            failures: result.failures,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Ledger state without copying (`status`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub discovered: usize,
    /// Discovered files present in the progress log
    pub completed: usize,
    /// Discovered files a fresh run would attempt
    pub remaining: usize,
    /// Distinct paths in the error log
    pub failing: usize,
    pub progress_log: PathBuf,
    pub error_log: PathBuf,
}

/// One-line destination summary printed before copying.
pub fn format_header(mode: RunMode, source: &Path, destination: &Path) -> String {
    let verb = match mode {
        RunMode::Fresh => "Copying",
        RunMode::Retry => "Retrying failed files",
        RunMode::Status => "Inspecting",
    };
    format!(
        "{} {} -> {}",
        style(verb).bold(),
        source.display(),
        destination.display()
    )
}

/// Human-readable final tally.
pub fn format_report(report: &SessionReport) -> String {
    let mut lines = Vec::new();

    if let Some(reason) = report.idle {
        lines.push(reason.describe().to_string());
    }

    lines.push("Summary:".to_string());
    match report.mode {
        RunMode::Retry => {
            lines.push(format!("  Listed in error log: {}", report.discovered));
        }
        _ => {
            lines.push(format!("  Discovered: {}", report.discovered));
            lines.push(format!("  Skipped (already copied): {}", report.skipped));
        }
    }
    lines.push(format!(
        "  Copied this session: {} ({})",
        style(report.copied).green(),
        HumanBytes(report.bytes_copied)
    ));

    if report.failed > 0 {
        lines.push(format!("  Failed this session: {}", style(report.failed).red()));
        for record in report.failures.iter().take(3) {
            lines.push(format!("    - {}: {}", record.path.display(), record.message));
        }
        if report.failures.len() > 3 {
            lines.push(format!("    - ... {} more", report.failures.len() - 3));
        }
    } else {
        lines.push("  Failed this session: 0".to_string());
    }

    if let Some(error_log) = &report.error_log {
        lines.push(format!(
            "Failures recorded in {}. Run `rekopy retry` to try them again.",
            error_log.display()
        ));
    }

    lines.join("\n")
}

pub fn format_status(status: &StatusReport) -> String {
    [
        "Status:".to_string(),
        format!("  Discovered: {}", status.discovered),
        format!("  Completed: {}", status.completed),
        format!("  Remaining: {}", status.remaining),
        format!("  Failing: {}", status.failing),
        format!("  Progress log: {}", status.progress_log.display()),
        format!("  Error log: {}", status.error_log.display()),
    ]
    .join("\n")
}
