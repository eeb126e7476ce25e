//! File I/O with atomic writes
//!
//! Sealing deletes the plaintext, so the artifact must be fully on disk
//! before that happens. Writes go to a uniquely named temp file in the same
//! directory, get synced, then are renamed over the target. Neighbouring
//! files are never touched.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{AegisError, AegisResult};

/// The file-system handle the sealing core works through
pub trait FileStore {
    /// Read a whole file
    fn read(&self, path: &Path) -> AegisResult<Vec<u8>>;

    /// Write a whole file, replacing any previous content
    fn write(&self, path: &Path, contents: &[u8]) -> AegisResult<()>;

    /// Delete a file
    fn remove(&self, path: &Path) -> AegisResult<()>;
}

/// FileStore backed by the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl FileStore for LocalFileStore {
    fn read(&self, path: &Path) -> AegisResult<Vec<u8>> {
        fs::read(path).map_err(|e| AegisError::io_at("read", path, e))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> AegisResult<()> {
        write_atomic(path, contents)
    }

    fn remove(&self, path: &Path) -> AegisResult<()> {
        fs::remove_file(path).map_err(|e| AegisError::io_at("delete", path, e))
    }
}

/// Write bytes to a file atomically (write to temp, then rename)
///
/// The file is either completely written or not modified at all.
pub fn write_atomic(path: &Path, contents: &[u8]) -> AegisResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Removed on drop if anything below fails
    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| AegisError::io_at("create temp file in", dir, e))?;

    temp.write_all(contents)
        .and_then(|_| temp.flush())
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| AegisError::io_at("write", path, e))?;

    temp.persist(path)
        .map_err(|e| AegisError::io_at("rename temp file to", path, e.error))?;

    Ok(())
}
