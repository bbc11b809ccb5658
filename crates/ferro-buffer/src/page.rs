//! The page frame payload.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use ferro_common::constants::PAGE_SIZE;
use ferro_common::types::{PageData, PageId};

/// Reference to a page resident in the buffer pool.
///
/// A `PageRef` is valid only while the caller holds its pin: after
/// `unpin_page` the pool may repurpose the frame at any time, and the
/// caller must not touch the reference again.
pub type PageRef = Arc<Page>;

/// A page frame: `PAGE_SIZE` bytes plus residency metadata.
///
/// The byte block is owned by the frame for the frame's lifetime; the page
/// ID names whichever on-disk page currently occupies it, or
/// `PageId::INVALID` for a free frame. Metadata is mutated only by the
/// owning pool instance, under the instance latch; callers observe it
/// through the read accessors and reach the bytes through [`Page::data`].
pub struct Page {
    /// The resident page's ID, or the invalid sentinel.
    page_id: RwLock<PageId>,
    /// Number of outstanding pins.
    pin_count: AtomicU32,
    /// Whether the in-memory bytes may differ from the on-disk bytes.
    is_dirty: AtomicBool,
    /// The page bytes.
    data: RwLock<PageData>,
}

impl Page {
    /// Creates an empty frame: invalid page ID, zeroed bytes, no pins.
    pub(crate) fn new() -> Self {
        Self {
            page_id: RwLock::new(PageId::INVALID),
            pin_count: AtomicU32::new(0),
            is_dirty: AtomicBool::new(false),
            data: RwLock::new([0; PAGE_SIZE]),
        }
    }

    /// Returns the ID of the page currently resident in this frame.
    pub fn page_id(&self) -> PageId {
        *self.page_id.read()
    }

    /// Returns the current pin count.
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::SeqCst)
    }

    /// Returns whether the frame is dirty.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty.load(Ordering::SeqCst)
    }

    /// Returns the lock guarding the page bytes.
    ///
    /// Callers read with `data().read()` and write with `data().write()`
    /// while holding a pin; a caller that writes must report it via
    /// `unpin_page(.., true)`.
    pub fn data(&self) -> &RwLock<PageData> {
        &self.data
    }

    pub(crate) fn set_page_id(&self, page_id: PageId) {
        *self.page_id.write() = page_id;
    }

    /// Increments the pin count, returning the new value.
    pub(crate) fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Decrements the pin count, returning the new value.
    ///
    /// The caller must have checked that the count is positive.
    pub(crate) fn unpin(&self) -> u32 {
        self.pin_count.fetch_sub(1, Ordering::SeqCst) - 1
    }

    pub(crate) fn set_pin_count(&self, count: u32) {
        self.pin_count.store(count, Ordering::SeqCst);
    }

    pub(crate) fn mark_dirty(&self) {
        self.is_dirty.store(true, Ordering::SeqCst);
    }

    pub(crate) fn clear_dirty(&self) {
        self.is_dirty.store(false, Ordering::SeqCst);
    }

    /// Resets the frame to its free state: invalid ID, clean, unpinned.
    ///
    /// The bytes are left in place; a frame's contents are meaningless
    /// until the next occupant overwrites them.
    pub(crate) fn reset(&self) {
        self.set_page_id(PageId::INVALID);
        self.set_pin_count(0);
        self.clear_dirty();
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("page_id", &self.page_id())
            .field("pin_count", &self.pin_count())
            .field("is_dirty", &self.is_dirty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frame_is_free() {
        let page = Page::new();
        assert!(!page.page_id().is_valid());
        assert_eq!(page.pin_count(), 0);
        assert!(!page.is_dirty());
        assert!(page.data().read().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pin_unpin() {
        let page = Page::new();
        assert_eq!(page.pin(), 1);
        assert_eq!(page.pin(), 2);
        assert_eq!(page.unpin(), 1);
        assert_eq!(page.unpin(), 0);
    }

    #[test]
    fn test_reset() {
        let page = Page::new();
        page.set_page_id(PageId::new(9));
        page.set_pin_count(1);
        page.mark_dirty();

        page.reset();
        assert!(!page.page_id().is_valid());
        assert_eq!(page.pin_count(), 0);
        assert!(!page.is_dirty());
    }
}
