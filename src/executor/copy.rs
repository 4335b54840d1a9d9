//! Verified single-file copy

use crate::types::{CopyOutcome, FailureKind};
use std::fs::{self, File};
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;

/// Stream buffer size for [`StreamCopy`]
const COPY_BUFFER_SIZE: usize = 128 * 1024;

/// The raw "copy bytes from here to there" step.
///
/// Implementations overwrite `dest` unconditionally and report the number of
/// bytes they wrote. They are not trusted: [`VerifiedCopier`] re-checks sizes
/// afterwards.
pub trait CopyPrimitive {
    fn copy(&self, src: &Path, dest: &Path) -> io::Result<u64>;
}

/// Buffered read/write copy that syncs the destination before returning.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamCopy;

impl CopyPrimitive for StreamCopy {
    fn copy(&self, src: &Path, dest: &Path) -> io::Result<u64> {
        let mut src_file = File::open(src)?;
        let mut dest_file = File::create(dest)?;

        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut total_bytes = 0u64;

        loop {
            let bytes_read = match src_file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            dest_file.write_all(&buffer[..bytes_read])?;
            total_bytes += bytes_read as u64;
        }

        dest_file.flush()?;
        dest_file.sync_all()?;
        Ok(total_bytes)
    }
}

/// Copies one file and confirms source and destination have the same length.
///
/// Protocol:
/// 1. source must still exist, otherwise `NotFound`
/// 2. destination parent directories are created
/// 3. the primitive copies, overwriting any existing destination
/// 4. sizes are compared; a mismatch is `VerificationFailed` even when the
///    primitive reported success
#[derive(Debug, Clone, Default)]
pub struct VerifiedCopier<C = StreamCopy> {
    primitive: C,
}

impl VerifiedCopier<StreamCopy> {
    pub fn new() -> Self {
        Self {
            primitive: StreamCopy,
        }
    }
}

impl<C: CopyPrimitive> VerifiedCopier<C> {
    /// Use a custom copy primitive
    pub fn with_primitive(primitive: C) -> Self {
        Self { primitive }
    }

    pub fn copy(&self, src: &Path, dest: &Path) -> CopyOutcome {
        let src_len = match fs::metadata(src) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return CopyOutcome::failed(FailureKind::NotFound, "source file no longer exists")
            }
            Err(e) => return io_failure("failed to read source metadata", &e, true),
        };

        if let Some(parent) = dest.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                return io_failure("failed to create destination directory", &e, true);
            }
        }

        if let Err(e) = self.primitive.copy(src, dest) {
            return io_failure("copy failed", &e, src.exists());
        }

        let dest_len = match fs::metadata(dest) {
            Ok(meta) => meta.len(),
            Err(e) => return io_failure("failed to read destination metadata", &e, true),
        };

        // Re-read the source in case it changed while we were copying.
        let src_len = fs::metadata(src).map(|m| m.len()).unwrap_or(src_len);

        if src_len != dest_len {
            return CopyOutcome::failed(
                FailureKind::VerificationFailed,
                format!(
                    "size mismatch: source {} bytes, destination {} bytes",
                    src_len, dest_len
                ),
            );
        }

        CopyOutcome::Success { bytes: dest_len }
    }
}

fn io_failure(context: &str, error: &io::Error, source_exists: bool) -> CopyOutcome {
    CopyOutcome::failed(
        FailureKind::from_io(error, source_exists),
        format!("{}: {}", context, error),
    )
}
