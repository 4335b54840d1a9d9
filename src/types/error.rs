//! Error types for rekopy

use std::path::PathBuf;
use thiserror::Error;

/// Session-level errors.
///
/// Per-file copy failures are not represented here; they travel as
/// [`CopyOutcome`](super::CopyOutcome) values so a single bad file never
/// aborts a session.
#[derive(Debug, Error)]
pub enum CopyError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error (logic checks)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Source directory is missing
    #[error("Source directory does not exist: {path}")]
    SourceNotFound { path: PathBuf },

    /// Traversal of the source tree failed
    #[error("Failed to enumerate {path}: {message}")]
    Discovery { path: PathBuf, message: String },

    /// A ledger file could not be read or written
    #[error("Ledger error at {path}: {source}")]
    Ledger {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CopyError {
    /// Wrap an IO error raised while touching a ledger file.
    pub fn ledger(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CopyError::Ledger {
            path: path.into(),
            source,
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            CopyError::Validation(_) | CopyError::Config(_) | CopyError::SourceNotFound { .. }
        )
    }

    /// Check if this error came from a ledger file
    pub fn is_ledger_error(&self) -> bool {
        matches!(self, CopyError::Ledger { .. })
    }
}
