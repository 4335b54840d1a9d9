//! Sequential file discovery

use crate::types::CopyError;
use std::path::{Path, PathBuf};

/// Callback for reporting discovery progress
///
/// Argument: total number of files discovered so far
pub type DiscoveryCallback = Box<dyn Fn(u64) + Send + Sync>;

/// Enumerate every file under `root_path`, recursively.
///
/// Returns absolute paths in a stable order (entries sorted by file name within
/// each directory). No ignore files or hidden-file rules are applied; every
/// regular file is returned, as is every symlink that resolves to a file.
///
/// # Arguments
/// * `root_path` - Directory to walk
/// * `skip` - Exact paths to leave out (the ledgers, when the destination
///   sits inside the source tree)
/// * `on_progress` - Optional callback invoked after each discovered file
///
/// # Errors
/// Any traversal error (for example the root becoming unreadable mid-walk)
/// aborts discovery with `CopyError::Discovery`.
pub fn discover_files(
    root_path: &Path,
    skip: &[PathBuf],
    on_progress: Option<&DiscoveryCallback>,
) -> Result<Vec<PathBuf>, CopyError> {
    let root = if root_path.is_absolute() {
        root_path.to_path_buf()
    } else {
        std::env::current_dir()?.join(root_path)
    };

    let walker = ignore::WalkBuilder::new(&root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = result.map_err(|e| CopyError::Discovery {
            path: root.clone(),
            message: e.to_string(),
        })?;

        let file_type = match entry.file_type() {
            Some(ft) => ft,
            None => continue, // stdin entry, never produced for a directory root
        };

        let is_file = if file_type.is_symlink() {
            std::fs::metadata(entry.path())
                .map(|m| m.is_file())
                .unwrap_or(false)
        } else {
            file_type.is_file()
        };
        if !is_file {
            continue;
        }

        let path = entry.into_path();
        if skip.iter().any(|s| s == &path) {
            continue;
        }

        files.push(path);
        if let Some(callback) = on_progress {
            callback(files.len() as u64);
        }
    }

    tracing::debug!(root = %root.display(), files = files.len(), "discovery finished");
    Ok(files)
}
