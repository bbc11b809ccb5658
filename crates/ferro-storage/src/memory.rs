//! In-memory disk manager.
//!
//! A heap-backed stand-in for `FileDiskManager`, used by unit tests and
//! benchmarks. Behavior matches the file-backed manager: unwritten pages
//! read as zeroes, deallocation forgets the page.

use std::collections::HashMap;

use parking_lot::Mutex;

use ferro_common::constants::PAGE_SIZE;
use ferro_common::error::{FerroError, FerroResult};
use ferro_common::types::{PageData, PageId};

use crate::disk::DiskManager;

/// Disk manager that keeps pages in a hash map.
#[derive(Default)]
pub struct MemDiskManager {
    pages: Mutex<HashMap<PageId, Box<PageData>>>,
}

impl MemDiskManager {
    /// Creates an empty in-memory disk manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of pages currently stored.
    pub fn page_count(&self) -> usize {
        self.pages.lock().len()
    }

    /// Returns a copy of the page's stored bytes, if any.
    ///
    /// Test hook: lets scenario tests inspect "disk" contents directly.
    pub fn stored_page(&self, page_id: PageId) -> Option<Box<PageData>> {
        self.pages.lock().get(&page_id).cloned()
    }

    fn check_valid(page_id: PageId) -> FerroResult<()> {
        if page_id.is_valid() {
            Ok(())
        } else {
            Err(FerroError::InvalidPageId { page_id })
        }
    }
}

impl DiskManager for MemDiskManager {
    fn read_page(&self, page_id: PageId, buf: &mut PageData) -> FerroResult<()> {
        Self::check_valid(page_id)?;
        match self.pages.lock().get(&page_id) {
            Some(data) => buf.copy_from_slice(&data[..]),
            None => buf.fill(0),
        }
        Ok(())
    }

    fn write_page(&self, page_id: PageId, buf: &PageData) -> FerroResult<()> {
        Self::check_valid(page_id)?;
        let mut pages = self.pages.lock();
        match pages.get_mut(&page_id) {
            Some(data) => data.copy_from_slice(buf),
            None => {
                let mut data: Box<PageData> = Box::new([0; PAGE_SIZE]);
                data.copy_from_slice(buf);
                pages.insert(page_id, data);
            }
        }
        Ok(())
    }

    fn deallocate_page(&self, page_id: PageId) -> FerroResult<()> {
        Self::check_valid(page_id)?;
        self.pages.lock().remove(&page_id);
        Ok(())
    }
}

impl std::fmt::Debug for MemDiskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemDiskManager")
            .field("page_count", &self.page_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let disk = MemDiskManager::new();
        let buf = [7u8; PAGE_SIZE];
        disk.write_page(PageId::new(1), &buf).unwrap();

        let mut out = [0u8; PAGE_SIZE];
        disk.read_page(PageId::new(1), &mut out).unwrap();
        assert_eq!(out, buf);
        assert_eq!(disk.page_count(), 1);
    }

    #[test]
    fn test_unwritten_page_reads_zero() {
        let disk = MemDiskManager::new();
        let mut buf = [0xEEu8; PAGE_SIZE];
        disk.read_page(PageId::new(99), &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_deallocate_forgets_page() {
        let disk = MemDiskManager::new();
        disk.write_page(PageId::new(5), &[1u8; PAGE_SIZE]).unwrap();
        disk.deallocate_page(PageId::new(5)).unwrap();

        assert_eq!(disk.page_count(), 0);
        let mut buf = [0xEEu8; PAGE_SIZE];
        disk.read_page(PageId::new(5), &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_invalid_page_id_rejected() {
        let disk = MemDiskManager::new();
        let mut buf = [0u8; PAGE_SIZE];
        assert!(disk.read_page(PageId::INVALID, &mut buf).is_err());
    }
}
