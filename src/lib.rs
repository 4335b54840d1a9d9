//! # rekopy - Resumable, Verified Bulk Copy
//!
//! Survives interruption, remembers what failed.
//!
//! Copies a file tree one file at a time, verifying each copy by size and
//! recording it in a progress log inside the destination. A killed run is
//! restarted without re-copying finished files; failures are kept in an error
//! log and can be re-attempted with `rekopy retry`.

// Module declarations
pub mod commands;
pub mod config;
pub mod executor;
pub mod ledger;
pub mod report;
pub mod scanner;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::{Config, RunMode};
pub use executor::{run_session, SessionContext, SessionResult, VerifiedCopier};
pub use ledger::{ErrorLedger, ErrorRecord, ProgressLedger};
pub use report::SessionReport;
pub use types::{CopyError, CopyOutcome, FailureKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
