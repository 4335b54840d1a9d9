//! Fresh (resumable) copy

use super::{ledger_paths, print_header, progress_callback, reporter_for};
use crate::executor::{run_session, SessionContext, VerifiedCopier};
use crate::ledger::{ErrorLedger, ProgressLedger};
use crate::report::{IdleReason, SessionReport};
use crate::scanner::{discover_files, DiscoveryCallback};
use crate::types::CopyError;
use crate::Config;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Copy everything under the source that the progress log does not list yet.
///
/// New failures are folded into the error log afterwards; see
/// [`ErrorLedger::reconcile`].
pub fn run(config: &Config) -> Result<SessionReport, CopyError> {
    config.validate()?;
    print_header(config);

    let reporter = reporter_for(config);
    if let Ok(mut progress) = reporter.lock() {
        progress.start_scan("source");
    }
    let on_discover: DiscoveryCallback = {
        let reporter = Arc::clone(&reporter);
        Box::new(move |files: u64| {
            if let Ok(progress) = reporter.lock() {
                progress.update_scan("source", files);
            }
        })
    };
    let discovered = discover_files(&config.source, &ledger_paths(config), Some(&on_discover))?;

    fs::create_dir_all(&config.destination)?;
    let progress_ledger = ProgressLedger::new(config.progress_log_path());
    let errors = ErrorLedger::new(config.error_log_path());

    let completed = progress_ledger.load()?;
    let worklist: Vec<PathBuf> = discovered
        .iter()
        .filter(|path| !completed.contains(path))
        .cloned()
        .collect();
    let skipped = discovered.len() - worklist.len();

    if let Ok(progress) = reporter.lock() {
        progress.finish_scan("source", discovered.len(), skipped);
    }
    tracing::info!(
        discovered = discovered.len(),
        skipped,
        pending = worklist.len(),
        "worklist built"
    );

    if worklist.is_empty() {
        let reason = if discovered.is_empty() {
            IdleReason::NoFiles
        } else {
            IdleReason::AllDone
        };
        return Ok(SessionReport::idle(
            config.mode,
            &config.source,
            &config.destination,
            discovered.len(),
            skipped,
            reason,
        ));
    }

    if let Ok(mut progress) = reporter.lock() {
        progress.start_transfer(worklist.len() as u64);
    }
    let callback = progress_callback(&reporter);
    let mut ctx =
        SessionContext::new(&config.source, &config.destination, progress_ledger)
            .with_callback(&callback);
    let result = run_session(&mut ctx, &worklist, &VerifiedCopier::new());

    errors.reconcile(&worklist, &result.failures)?;

    Ok(SessionReport::from_session(
        config.mode,
        &config.source,
        &config.destination,
        discovered.len(),
        skipped,
        result,
        errors.path(),
    ))
}
