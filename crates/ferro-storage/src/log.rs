//! Minimal write-ahead-log handle.
//!
//! The buffer pool accepts a `LogManager` at construction for future WAL
//! integration; its current contract does not invoke it. The manager
//! itself is a plain append-only file writer.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use ferro_common::error::FerroResult;

/// Append-only log file writer.
pub struct LogManager {
    /// The log file, serialized for append atomicity.
    file: Mutex<File>,
    /// The log file path.
    path: PathBuf,
    /// Total bytes appended.
    bytes_written: AtomicU64,
    /// Total records appended.
    records_written: AtomicU64,
}

impl LogManager {
    /// Opens (creating if necessary) the log file at `path`.
    pub fn open(path: impl AsRef<Path>) -> FerroResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            file: Mutex::new(file),
            path,
            bytes_written: AtomicU64::new(0),
            records_written: AtomicU64::new(0),
        })
    }

    /// Appends one record to the log.
    pub fn append(&self, record: &[u8]) -> FerroResult<()> {
        let mut file = self.file.lock();
        file.write_all(record)?;
        self.bytes_written
            .fetch_add(record.len() as u64, Ordering::Relaxed);
        self.records_written.fetch_add(1, Ordering::Relaxed);
        trace!(bytes = record.len(), "appended log record");
        Ok(())
    }

    /// Forces appended records to stable storage.
    pub fn sync(&self) -> FerroResult<()> {
        self.file.lock().sync_data()?;
        Ok(())
    }

    /// Returns the log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the total bytes appended so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Returns the total records appended so far.
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for LogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogManager")
            .field("path", &self.path)
            .field("bytes_written", &self.bytes_written())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_append_and_sync() {
        let dir = tempdir().unwrap();
        let log = LogManager::open(dir.path().join("wal.log")).unwrap();

        log.append(b"record one").unwrap();
        log.append(b"record two").unwrap();
        log.sync().unwrap();

        assert_eq!(log.records_written(), 2);
        assert_eq!(log.bytes_written(), 20);
        assert_eq!(
            std::fs::metadata(log.path()).unwrap().len(),
            log.bytes_written()
        );
    }
}
