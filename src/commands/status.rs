//! Read-only view of the ledgers

use super::ledger_paths;
use crate::ledger::{ErrorLedger, ProgressLedger};
use crate::report::StatusReport;
use crate::scanner::discover_files;
use crate::types::CopyError;
use crate::Config;

/// Count what a fresh run would skip and attempt, and what is failing.
///
/// Nothing is created or written, not even the destination directory.
pub fn run(config: &Config) -> Result<StatusReport, CopyError> {
    config.validate()?;

    let discovered = discover_files(&config.source, &ledger_paths(config), None)?;
    let completed_set = ProgressLedger::new(config.progress_log_path()).load()?;
    let completed = discovered
        .iter()
        .filter(|path| completed_set.contains(path))
        .count();
    let failing = ErrorLedger::new(config.error_log_path())
        .load_failed_paths()?
        .len();

    Ok(StatusReport {
        source: config.source.clone(),
        destination: config.destination.clone(),
        discovered: discovered.len(),
        completed,
        remaining: discovered.len() - completed,
        failing,
        progress_log: config.progress_log_path(),
        error_log: config.error_log_path(),
    })
}
