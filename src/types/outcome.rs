//! CopyOutcome - Result of a single copy-and-verify attempt

use serde::Serialize;
use std::fmt;
use std::io::ErrorKind;

/// Why a single file failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureKind {
    /// Source vanished between discovery and the copy attempt
    NotFound,

    /// The copy primitive (or a ledger write) raised an IO error
    IoFailure,

    /// Copy reported success but destination size differs from source
    VerificationFailed,
}

impl FailureKind {
    /// Short label used in error-log messages and summaries
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::NotFound => "Not found",
            FailureKind::IoFailure => "I/O error",
            FailureKind::VerificationFailed => "Verification failed",
        }
    }

    /// Classify an IO error raised while copying.
    ///
    /// `NotFound` is reserved for a vanished source; a missing destination
    /// path is an ordinary `IoFailure`.
    pub fn from_io(error: &std::io::Error, source_exists: bool) -> Self {
        match error.kind() {
            ErrorKind::NotFound if !source_exists => FailureKind::NotFound,
            _ => FailureKind::IoFailure,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal state of one file in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Copied and verified
    Success { bytes: u64 },

    /// Copy or verification failed
    Failed { kind: FailureKind, message: String },
}

impl CopyOutcome {
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        CopyOutcome::Failed {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CopyOutcome::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_maps_not_found() {
        let err = std::io::Error::new(ErrorKind::NotFound, "gone");
        assert_eq!(FailureKind::from_io(&err, false), FailureKind::NotFound);
        assert_eq!(FailureKind::from_io(&err, true), FailureKind::IoFailure);

        let err = std::io::Error::new(ErrorKind::PermissionDenied, "denied");
        assert_eq!(FailureKind::from_io(&err, false), FailureKind::IoFailure);
    }

    #[test]
    fn test_failed_constructor() {
        let outcome = CopyOutcome::failed(FailureKind::VerificationFailed, "size mismatch");
        assert!(!outcome.is_success());
        assert_eq!(
            outcome,
            CopyOutcome::Failed {
                kind: FailureKind::VerificationFailed,
                message: "size mismatch".to_string()
            }
        );
        assert!(CopyOutcome::Success { bytes: 3 }.is_success());
    }
}
