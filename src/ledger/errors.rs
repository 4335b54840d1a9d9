//! Error ledger - one `<source-path>|<message>` line per currently failing file

use super::{ledger_lines, path_bytes, path_from_bytes, path_key, trim_line_ending};
use crate::types::CopyError;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Separates the source path from the message on each line
pub const FIELD_DELIMITER: char = '|';

/// A file that failed, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    #[serde(serialize_with = "serialize_lossy")]
    pub path: PathBuf,
    pub message: String,
}

impl ErrorRecord {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Serialize as a single ledger line (without trailing newline).
    ///
    /// Line breaks inside the message would split the record, so they are
    /// flattened to spaces.
    /// The path is written as raw bytes; the message is always UTF-8.
    pub fn to_line(&self) -> Vec<u8> {
        let message: String = self
            .message
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        let mut line = path_bytes(&self.path).into_owned();
        line.push(FIELD_DELIMITER as u8);
        line.extend_from_slice(message.as_bytes());
        line
    }

    /// Parse a ledger line. Lines without a delimiter or with an empty path
    /// field are malformed and yield `None`.
    pub fn parse_line(line: &[u8]) -> Option<Self> {
        let line = trim_line_ending(line);
        let split = line.iter().position(|&b| b == FIELD_DELIMITER as u8)?;
        let (path, message) = (&line[..split], &line[split + 1..]);
        if path.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        Some(Self::new(
            path_from_bytes(path),
            String::from_utf8_lossy(message).into_owned(),
        ))
    }
}

/// Log of files that failed in their most recent attempt.
#[derive(Debug, Clone)]
pub struct ErrorLedger {
    path: PathBuf,
}

impl ErrorLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All well-formed records in file order. A missing file yields no records.
    pub fn load_records(&self) -> Result<Vec<ErrorRecord>, CopyError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CopyError::ledger(&self.path, e)),
        };

        let mut records = Vec::new();
        for (idx, line) in ledger_lines(&content) {
            match ErrorRecord::parse_line(line) {
                Some(record) => records.push(record),
                None => tracing::debug!(
                    ledger = %self.path.display(),
                    line = idx + 1,
                    "skipping malformed error ledger entry"
                ),
            }
        }
        Ok(records)
    }

    /// Source paths of failed files, de-duplicated (case-insensitive) in
    /// first-seen order.
    pub fn load_failed_paths(&self) -> Result<Vec<PathBuf>, CopyError> {
        let mut seen = HashSet::new();
        Ok(self
            .load_records()?
            .into_iter()
            .filter(|record| seen.insert(path_key(&record.path)))
            .map(|record| record.path)
            .collect())
    }

    /// Replace the whole ledger with exactly `records`.
    ///
    /// Writes a sibling `.part` file, syncs it, then renames it over the
    /// ledger so a crash leaves either the old or the new content.
    pub fn overwrite(&self, records: &[ErrorRecord]) -> Result<(), CopyError> {
        let part_path = self.path.with_extension("part");
        let mut part_file = File::create(&part_path).map_err(|e| CopyError::ledger(&part_path, e))?;
        write_records(&mut part_file, records)
            .and_then(|_| part_file.sync_all())
            .map_err(|e| CopyError::ledger(&part_path, e))?;
        drop(part_file);

        fs::rename(&part_path, &self.path).map_err(|e| CopyError::ledger(&self.path, e))
    }

    /// Add `records` after the existing content. Nothing is created when
    /// there is nothing to add.
    pub fn append(&self, records: &[ErrorRecord]) -> Result<(), CopyError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| CopyError::ledger(&self.path, e))?;
        write_records(&mut file, records)
            .and_then(|_| file.sync_data())
            .map_err(|e| CopyError::ledger(&self.path, e))
    }

    /// Fold a fresh-copy session's failures into the ledger.
    ///
    /// Records for paths attempted this session are dropped (they either
    /// succeeded or have a newer failure in `failures`); everything else is
    /// kept and the new failures follow. When nothing attempted overlaps the
    /// existing records this is a plain append.
    pub fn reconcile(&self, attempted: &[PathBuf], failures: &[ErrorRecord]) -> Result<(), CopyError> {
        let previous = self.load_records()?;
        let attempted: HashSet<Vec<u8>> = attempted.iter().map(|p| path_key(p)).collect();

        let stale = previous
            .iter()
            .filter(|record| attempted.contains(&path_key(&record.path)))
            .count();

        if stale == 0 {
            return self.append(failures);
        }

        tracing::debug!(
            ledger = %self.path.display(),
            superseded = stale,
            "rewriting error ledger without superseded records"
        );
        let mut merged: Vec<ErrorRecord> = previous
            .into_iter()
            .filter(|record| !attempted.contains(&path_key(&record.path)))
            .collect();
        merged.extend(failures.iter().cloned());
        self.overwrite(&merged)
    }
}

fn write_records(file: &mut File, records: &[ErrorRecord]) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    for record in records {
        buffer.extend_from_slice(&record.to_line());
        buffer.push(b'\n');
    }
    file.write_all(&buffer)?;
    file.flush()
}

/// JSON has no representation for non-UTF-8 paths; reports show them lossily.
fn serialize_lossy<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}
