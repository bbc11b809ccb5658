//! File-backed disk manager.
//!
//! Pages live in a single database file at offset `page_id * PAGE_SIZE`.
//! The file grows on demand; a read past the current end of file yields
//! zeroes, which is how a page that was allocated but never flushed reads
//! back.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use ferro_common::constants::PAGE_SIZE;
use ferro_common::error::{FerroError, FerroResult};
use ferro_common::types::{PageData, PageId};

use crate::disk::DiskManager;

/// Disk manager that stores pages in a single file.
///
/// # Example
///
/// ```no_run
/// use ferro_storage::{DiskManager, FileDiskManager};
/// use ferro_common::types::PageId;
/// use ferro_common::constants::PAGE_SIZE;
///
/// let disk = FileDiskManager::open("ferro.db").unwrap();
/// let buf = [0u8; PAGE_SIZE];
/// disk.write_page(PageId::new(0), &buf).unwrap();
/// ```
pub struct FileDiskManager {
    /// The database file, serialized for per-page atomicity.
    file: Mutex<File>,
    /// The file path.
    path: PathBuf,
    /// Number of page reads served.
    num_reads: AtomicU64,
    /// Number of page writes performed.
    num_writes: AtomicU64,
    /// Number of pages deallocated.
    num_deallocations: AtomicU64,
}

impl FileDiskManager {
    /// Opens (creating if necessary) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> FerroResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;
        Ok(Self {
            file: Mutex::new(file),
            path,
            num_reads: AtomicU64::new(0),
            num_writes: AtomicU64::new(0),
            num_deallocations: AtomicU64::new(0),
        })
    }

    /// Returns the database file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of page reads served.
    pub fn num_reads(&self) -> u64 {
        self.num_reads.load(Ordering::Relaxed)
    }

    /// Returns the number of page writes performed.
    pub fn num_writes(&self) -> u64 {
        self.num_writes.load(Ordering::Relaxed)
    }

    /// Returns the number of pages deallocated.
    pub fn num_deallocations(&self) -> u64 {
        self.num_deallocations.load(Ordering::Relaxed)
    }

    fn offset_of(page_id: PageId) -> u64 {
        page_id.as_u64() * PAGE_SIZE as u64
    }

    fn check_valid(page_id: PageId) -> FerroResult<()> {
        if page_id.is_valid() {
            Ok(())
        } else {
            Err(FerroError::InvalidPageId { page_id })
        }
    }
}

impl DiskManager for FileDiskManager {
    fn read_page(&self, page_id: PageId, buf: &mut PageData) -> FerroResult<()> {
        Self::check_valid(page_id)?;
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(Self::offset_of(page_id)))?;

        // A short read means the page sits past the end of the file; the
        // unwritten tail reads as zeroes.
        let mut filled = 0;
        while filled < PAGE_SIZE {
            let n = file.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled < PAGE_SIZE {
            debug!(page_id = %page_id, filled, "short read past end of file, zero-filling");
            buf[filled..].fill(0);
        }

        self.num_reads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn write_page(&self, page_id: PageId, buf: &PageData) -> FerroResult<()> {
        Self::check_valid(page_id)?;
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(Self::offset_of(page_id)))?;
        file.write_all(buf)?;
        file.flush()?;

        self.num_writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn deallocate_page(&self, page_id: PageId) -> FerroResult<()> {
        Self::check_valid(page_id)?;
        // The block is not reclaimed; deallocation is bookkeeping until a
        // free-space map exists.
        // TODO: reuse deallocated blocks once the disk format grows a
        // free-space map.
        debug!(page_id = %page_id, "deallocating page");
        self.num_deallocations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl std::fmt::Debug for FileDiskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDiskManager")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_and_read_page() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("test.db")).unwrap();

        let mut out = [0u8; PAGE_SIZE];
        out[0] = 0xAB;
        out[PAGE_SIZE - 1] = 0xCD;
        disk.write_page(PageId::new(3), &out).unwrap();

        let mut buf = [0u8; PAGE_SIZE];
        disk.read_page(PageId::new(3), &mut buf).unwrap();
        assert_eq!(buf[0], 0xAB);
        assert_eq!(buf[PAGE_SIZE - 1], 0xCD);
        assert_eq!(disk.num_writes(), 1);
        assert_eq!(disk.num_reads(), 1);
    }

    #[test]
    fn test_read_past_eof_zero_fills() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("empty.db")).unwrap();

        let mut buf = [0xFFu8; PAGE_SIZE];
        disk.read_page(PageId::new(10), &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pages_do_not_overlap() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("multi.db")).unwrap();

        for i in 0..4u64 {
            let buf = [i as u8 + 1; PAGE_SIZE];
            disk.write_page(PageId::new(i), &buf).unwrap();
        }
        for i in 0..4u64 {
            let mut buf = [0u8; PAGE_SIZE];
            disk.read_page(PageId::new(i), &mut buf).unwrap();
            assert!(buf.iter().all(|&b| b == i as u8 + 1));
        }
    }

    #[test]
    fn test_invalid_page_id_rejected() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("invalid.db")).unwrap();

        let mut buf = [0u8; PAGE_SIZE];
        assert!(disk.read_page(PageId::INVALID, &mut buf).is_err());
        assert!(disk.write_page(PageId::INVALID, &buf).is_err());
        assert!(disk.deallocate_page(PageId::INVALID).is_err());
    }

    #[test]
    fn test_deallocate_counts() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("dealloc.db")).unwrap();

        disk.deallocate_page(PageId::new(1)).unwrap();
        disk.deallocate_page(PageId::new(2)).unwrap();
        assert_eq!(disk.num_deallocations(), 2);
    }
}
