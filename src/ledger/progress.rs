//! Progress ledger - append-only record of verified copies

use super::{ledger_lines, line_key, path_bytes, path_key};
use crate::types::CopyError;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Source paths already copied, compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct CompletedSet {
    keys: HashSet<Vec<u8>>,
}

impl CompletedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &Path) -> bool {
        self.keys.insert(path_key(path))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.keys.contains(&path_key(path))
    }

    /// Number of distinct paths (duplicate ledger lines count once)
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Append-only log of successfully copied source paths.
///
/// The file is created on the first append. Every append is synced to disk
/// before returning, so a record present after a crash always corresponds to a
/// verified copy and a verified copy is never lost once this call returns.
#[derive(Debug)]
pub struct ProgressLedger {
    path: PathBuf,
    writer: Option<File>,
}

impl ProgressLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the ledger as a set. A missing file is an empty set.
    pub fn load(&self) -> Result<CompletedSet, CopyError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CompletedSet::new()),
            Err(e) => return Err(CopyError::ledger(&self.path, e)),
        };

        let keys = ledger_lines(&content).map(|(_, line)| line_key(line)).collect();

        Ok(CompletedSet { keys })
    }

    /// Append one verified source path and sync it to disk.
    pub fn record_success(&mut self, file: &Path) -> Result<(), CopyError> {
        let mut line = path_bytes(file).into_owned();
        line.push(b'\n');
        let path = self.path.clone();

        let writer = self.writer()?;
        writer
            .write_all(&line)
            .and_then(|_| writer.flush())
            .and_then(|_| writer.sync_data())
            .map_err(|e| CopyError::ledger(path, e))
    }

    fn writer(&mut self) -> Result<&mut File, CopyError> {
        match self.writer {
            Some(ref mut file) => Ok(file),
            None => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent).map_err(|e| CopyError::ledger(&self.path, e))?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .map_err(|e| CopyError::ledger(&self.path, e))?;
                Ok(self.writer.insert(file))
            }
        }
    }
}
