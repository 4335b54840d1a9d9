//! Retry previously failed files

use super::{print_header, progress_callback, reporter_for};
use crate::executor::{run_session, SessionContext, VerifiedCopier};
use crate::ledger::{ErrorLedger, ProgressLedger};
use crate::report::{IdleReason, SessionReport};
use crate::types::CopyError;
use crate::Config;
use std::fs;

/// Re-attempt exactly the paths in the error log.
///
/// Afterwards the error log is replaced with this session's failures only.
/// An empty or missing error log means there is nothing to do and no file is
/// touched.
pub fn run(config: &Config) -> Result<SessionReport, CopyError> {
    config.validate()?;
    print_header(config);

    let errors = ErrorLedger::new(config.error_log_path());
    let worklist = errors.load_failed_paths()?;

    if worklist.is_empty() {
        tracing::info!(ledger = %errors.path().display(), "error log empty, nothing to retry");
        return Ok(SessionReport::idle(
            config.mode,
            &config.source,
            &config.destination,
            0,
            0,
            IdleReason::NoFailures,
        ));
    }

    fs::create_dir_all(&config.destination)?;
    let reporter = reporter_for(config);
    if let Ok(mut progress) = reporter.lock() {
        progress.start_transfer(worklist.len() as u64);
    }

    let callback = progress_callback(&reporter);
    let mut ctx = SessionContext::new(
        &config.source,
        &config.destination,
        ProgressLedger::new(config.progress_log_path()),
    )
    .with_callback(&callback);
    let result = run_session(&mut ctx, &worklist, &VerifiedCopier::new());

    errors.overwrite(&result.failures)?;

    Ok(SessionReport::from_session(
        config.mode,
        &config.source,
        &config.destination,
        worklist.len(),
        0,
        result,
        errors.path(),
    ))
}
