//! Core type definitions for rekopy

mod error;
mod outcome;

pub use error::CopyError;
pub use outcome::{CopyOutcome, FailureKind};
