//! On-disk ledgers that make a copy resumable
//!
//! Both ledgers live inside the destination root and are the only state that
//! survives between runs:
//! - the progress ledger lists source paths whose copy was verified
//! - the error ledger lists `<source-path>|<message>` for files currently failing
//!
//! Paths are stored as their raw OS bytes so names that are not valid UTF-8
//! survive a round trip through either ledger.

pub mod errors;
pub mod progress;

pub use errors::{ErrorLedger, ErrorRecord, FIELD_DELIMITER};
pub use progress::{CompletedSet, ProgressLedger};

use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Membership key for ledger comparisons (case-insensitive).
///
/// UTF-8 names are lowercased fully; other names only have their ASCII bytes
/// folded, so two names differing in a non-UTF-8 byte never share a key.
pub fn path_key(path: &Path) -> Vec<u8> {
    line_key(&path_bytes(path))
}

pub(crate) fn line_key(line: &[u8]) -> Vec<u8> {
    match std::str::from_utf8(line) {
        Ok(text) => text.to_lowercase().into_bytes(),
        Err(_) => line.to_ascii_lowercase(),
    }
}

/// Strip a trailing `\r` left by CRLF line endings.
pub(crate) fn trim_line_ending(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

pub(crate) fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

/// Non-empty lines of a ledger file, CRLF endings trimmed.
pub(crate) fn ledger_lines(content: &[u8]) -> impl Iterator<Item = (usize, &[u8])> {
    content
        .split(|&b| b == b'\n')
        .map(trim_line_ending)
        .enumerate()
        .filter(|(_, line)| !is_blank(line))
}

#[cfg(unix)]
pub(crate) fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
pub(crate) fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    match path.to_string_lossy() {
        Cow::Borrowed(text) => Cow::Borrowed(text.as_bytes()),
        Cow::Owned(text) => Cow::Owned(text.into_bytes()),
    }
}

#[cfg(unix)]
pub(crate) fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
pub(crate) fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}
