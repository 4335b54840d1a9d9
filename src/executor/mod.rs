//! Copy session engine
//!
//! Drives [`VerifiedCopier`] over a worklist, one file at a time, and records
//! every verified copy in the progress ledger before moving on. Per-file
//! failures are collected and returned; they never abort the session.

pub mod copy;

use crate::ledger::{ErrorRecord, ProgressLedger};
use crate::types::{CopyOutcome, FailureKind};
use std::path::{Path, PathBuf};

pub use copy::{CopyPrimitive, StreamCopy, VerifiedCopier};

/// Events emitted while a session runs.
#[derive(Debug)]
pub enum SessionEvent<'a> {
    /// About to attempt a file.
    FileStart {
        index: usize,
        total: usize,
        path: &'a Path,
    },
    /// Copied, verified and recorded.
    FileSuccess {
        index: usize,
        total: usize,
        path: &'a Path,
        bytes: u64,
    },
    /// Failed; the session continues with the next file.
    FileError {
        index: usize,
        total: usize,
        path: &'a Path,
        kind: FailureKind,
        message: &'a str,
    },
    /// Worklist exhausted.
    Complete { result: &'a SessionResult },
}

/// Observer for session events. Purely informational.
pub type SessionCallback = dyn Fn(&SessionEvent<'_>) + Send + Sync;

/// Everything a session needs besides the worklist.
pub struct SessionContext<'a> {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub progress: ProgressLedger,
    pub on_event: Option<&'a SessionCallback>,
}

impl<'a> SessionContext<'a> {
    pub fn new(
        source_root: impl Into<PathBuf>,
        destination_root: impl Into<PathBuf>,
        progress: ProgressLedger,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
            progress,
            on_event: None,
        }
    }

    pub fn with_callback(mut self, callback: &'a SessionCallback) -> Self {
        self.on_event = Some(callback);
        self
    }

    fn emit(&self, event: SessionEvent<'_>) {
        if let Some(callback) = self.on_event {
            callback(&event);
        }
    }
}

/// What one engine run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionResult {
    /// Files attempted (the worklist length)
    pub attempted: usize,
    /// Files copied, verified and recorded
    pub copied: usize,
    /// Bytes written for successful files
    pub bytes_copied: u64,
    /// One record per failed file, in worklist order
    pub failures: Vec<ErrorRecord>,
}

/// Run a copy session over `worklist`.
///
/// For each file, in order: derive its destination, copy and verify, then on
/// success append it to the progress ledger (synced) before touching the
/// next file. A ledger append failure turns that file into an `IoFailure` so
/// it stays retryable.
pub fn run_session<C: CopyPrimitive>(
    ctx: &mut SessionContext<'_>,
    worklist: &[PathBuf],
    copier: &VerifiedCopier<C>,
) -> SessionResult {
    let total = worklist.len();
    let mut result = SessionResult {
        attempted: total,
        ..Default::default()
    };

    if worklist.is_empty() {
        tracing::info!("empty worklist, nothing to copy");
        ctx.emit(SessionEvent::Complete { result: &result });
        return result;
    }

    tracing::info!(
        files = total,
        source = %ctx.source_root.display(),
        destination = %ctx.destination_root.display(),
        "copy session started"
    );

    for (idx, path) in worklist.iter().enumerate() {
        let index = idx + 1;
        ctx.emit(SessionEvent::FileStart { index, total, path });

        let outcome = attempt(ctx, path, copier);

        match outcome {
            CopyOutcome::Success { bytes } => {
                tracing::debug!(file = %path.display(), bytes, "copied");
                result.copied += 1;
                result.bytes_copied += bytes;
                ctx.emit(SessionEvent::FileSuccess {
                    index,
                    total,
                    path,
                    bytes,
                });
            }
            CopyOutcome::Failed { kind, message } => {
                tracing::warn!(file = %path.display(), %kind, reason = %message, "copy failed");
                ctx.emit(SessionEvent::FileError {
                    index,
                    total,
                    path,
                    kind,
                    message: &message,
                });
                result
                    .failures
                    .push(ErrorRecord::new(path.clone(), format!("{}: {}", kind, message)));
            }
        }
    }

    tracing::info!(
        copied = result.copied,
        failed = result.failures.len(),
        bytes = result.bytes_copied,
        "copy session finished"
    );
    ctx.emit(SessionEvent::Complete { result: &result });
    result
}

/// Copy, verify, record. The ledger write only happens after verification.
fn attempt<C: CopyPrimitive>(
    ctx: &mut SessionContext<'_>,
    path: &Path,
    copier: &VerifiedCopier<C>,
) -> CopyOutcome {
    let dest = match destination_for(&ctx.source_root, &ctx.destination_root, path) {
        Some(dest) => dest,
        None => {
            return CopyOutcome::failed(
                FailureKind::IoFailure,
                format!("path is not under source root {}", ctx.source_root.display()),
            )
        }
    };

    let outcome = copier.copy(path, &dest);
    if let CopyOutcome::Success { .. } = outcome {
        if let Err(e) = ctx.progress.record_success(path) {
            return CopyOutcome::failed(
                FailureKind::IoFailure,
                format!("copied but failed to record progress: {}", e),
            );
        }
    }
    outcome
}

/// Map a source path to its destination.
///
/// The source root is stripped component-wise, so the remainder never starts
/// with a separator and the file name keeps its exact OS bytes. Returns
/// `None` when `path` is not strictly below the source root.
pub fn destination_for(source_root: &Path, destination_root: &Path, path: &Path) -> Option<PathBuf> {
    let relative = path.strip_prefix(source_root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(destination_root.join(relative))
}
