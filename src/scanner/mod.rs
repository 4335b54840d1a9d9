//! Source tree discovery

mod walker;

pub use walker::{discover_files, DiscoveryCallback};
