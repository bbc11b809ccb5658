//! The single buffer pool instance.
//!
//! One instance owns a fixed array of frames, a page table, a free list,
//! and an LRU replacer, and serializes every operation with one latch. In
//! a sharded pool each instance serves the residue class of page IDs that
//! equals its index; standalone, it serves them all.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use ferro_common::error::FerroResult;
use ferro_common::types::{FrameId, PageId};
use ferro_storage::{DiskManager, LogManager};

use crate::page::{Page, PageRef};
use crate::replacer::LruReplacer;
use crate::stats::PoolStats;

/// Bookkeeping guarded by the instance latch.
struct PoolState {
    /// Maps resident page IDs to the frames holding them.
    page_table: HashMap<PageId, FrameId>,
    /// Frames holding no page, in insertion order; victims come from the
    /// front, ahead of any eviction.
    free_list: VecDeque<FrameId>,
    /// Next page ID this instance will allocate; starts at the instance
    /// index and advances by the instance count, so every ID allocated
    /// here routes back to this instance.
    next_page_id: u64,
}

/// One buffer pool shard.
///
/// The five public operations (`fetch_page`, `new_page`, `unpin_page`,
/// `flush_page`, `delete_page`) each hold the instance latch for their
/// whole duration, including any disk I/O: no other operation on the same
/// instance can observe a half-replaced frame.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use ferro_buffer::BufferPoolInstance;
/// use ferro_storage::MemDiskManager;
///
/// let pool = BufferPoolInstance::new(4, Arc::new(MemDiskManager::new()), None);
/// let (page_id, page) = pool.new_page().unwrap().unwrap();
/// page.data().write()[0] = 1;
/// pool.unpin_page(page_id, true);
/// assert!(pool.flush_page(page_id).unwrap());
/// ```
pub struct BufferPoolInstance {
    /// Number of frames.
    pool_size: usize,
    /// Total shard count of the owning pool (1 when standalone).
    num_instances: usize,
    /// This shard's index in `[0, num_instances)`.
    instance_index: usize,
    /// The frame array, indexed by frame ID.
    frames: Box<[PageRef]>,
    /// Instance latch.
    state: Mutex<PoolState>,
    /// Eviction candidates; its own lock nests inside the instance latch.
    replacer: LruReplacer,
    /// Shared page I/O.
    disk_manager: Arc<dyn DiskManager>,
    /// Held for future WAL integration; not yet invoked.
    log_manager: Option<Arc<LogManager>>,
    /// Hit/miss/eviction counters.
    stats: PoolStats,
}

impl BufferPoolInstance {
    /// Creates a standalone instance owning the whole page-id space.
    #[must_use]
    pub fn new(
        pool_size: usize,
        disk_manager: Arc<dyn DiskManager>,
        log_manager: Option<Arc<LogManager>>,
    ) -> Self {
        Self::new_sharded(pool_size, 1, 0, disk_manager, log_manager)
    }

    /// Creates one shard of a parallel pool.
    ///
    /// # Panics
    ///
    /// Panics if `pool_size` or `num_instances` is zero, or if
    /// `instance_index` is out of range.
    #[must_use]
    pub fn new_sharded(
        pool_size: usize,
        num_instances: usize,
        instance_index: usize,
        disk_manager: Arc<dyn DiskManager>,
        log_manager: Option<Arc<LogManager>>,
    ) -> Self {
        assert!(pool_size > 0, "pool_size must be positive");
        assert!(num_instances > 0, "num_instances must be positive");
        assert!(
            instance_index < num_instances,
            "instance_index {instance_index} out of range for {num_instances} instances"
        );

        let frames: Box<[PageRef]> = (0..pool_size).map(|_| Arc::new(Page::new())).collect();

        // Initially, every frame is in the free list.
        let free_list: VecDeque<FrameId> = (0..pool_size).map(|i| FrameId::new(i as u32)).collect();

        Self {
            pool_size,
            num_instances,
            instance_index,
            frames,
            state: Mutex::new(PoolState {
                page_table: HashMap::with_capacity(pool_size),
                free_list,
                next_page_id: instance_index as u64,
            }),
            replacer: LruReplacer::new(pool_size),
            disk_manager,
            log_manager,
            stats: PoolStats::new(),
        }
    }

    /// Returns the number of frames in this instance.
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Returns this shard's index.
    #[must_use]
    pub fn instance_index(&self) -> usize {
        self.instance_index
    }

    /// Returns the log manager handle, if one was supplied.
    #[must_use]
    pub fn log_manager(&self) -> Option<&Arc<LogManager>> {
        self.log_manager.as_ref()
    }

    /// Returns this instance's statistics.
    #[must_use]
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Returns the page's pin count, or `None` if it is not resident.
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        let state = self.state.lock();
        state
            .page_table
            .get(&page_id)
            .map(|fid| self.frames[fid.index()].pin_count())
    }

    /// Returns true if the page is resident in this instance.
    pub fn contains_page(&self, page_id: PageId) -> bool {
        self.state.lock().page_table.contains_key(&page_id)
    }

    /// Fetches the page, reading it from disk on a miss.
    ///
    /// The returned page is pinned; the caller must balance the fetch with
    /// one `unpin_page`. Returns `Ok(None)` only when the page is not
    /// resident and no frame can be freed (every frame pinned).
    pub fn fetch_page(&self, page_id: PageId) -> FerroResult<Option<PageRef>> {
        if !page_id.is_valid() {
            return Ok(None);
        }
        debug_assert_eq!(
            page_id.shard_of(self.num_instances),
            self.instance_index,
            "page {page_id} routed to wrong instance"
        );

        let mut state = self.state.lock();

        if let Some(&frame_id) = state.page_table.get(&page_id) {
            let frame = &self.frames[frame_id.index()];
            frame.pin();
            self.replacer.pin(frame_id);
            self.stats.record_hit();
            trace!(page_id = %page_id, frame_id = %frame_id, "fetch hit");
            return Ok(Some(Arc::clone(frame)));
        }

        self.stats.record_miss();
        let Some(frame_id) = self.find_replacement(&mut state)? else {
            debug!(page_id = %page_id, "fetch miss with every frame pinned");
            return Ok(None);
        };

        let frame = &self.frames[frame_id.index()];
        if let Err(e) = self.disk_manager.read_page(page_id, &mut frame.data().write()) {
            // The old occupant is gone (and flushed if it was dirty); the
            // frame goes back to the free list rather than holding a
            // half-read page.
            frame.reset();
            state.free_list.push_back(frame_id);
            return Err(e);
        }

        frame.set_page_id(page_id);
        frame.set_pin_count(1);
        frame.clear_dirty();
        state.page_table.insert(page_id, frame_id);
        self.replacer.pin(frame_id);
        trace!(page_id = %page_id, frame_id = %frame_id, "fetch miss, read from disk");
        Ok(Some(Arc::clone(frame)))
    }

    /// Allocates a fresh page and pins it in a frame.
    ///
    /// The new page's contents are zeroed, and the zeroed page is written
    /// through the disk manager so it exists on disk for future fetches.
    /// Returns `Ok(None)` when every frame is pinned.
    pub fn new_page(&self) -> FerroResult<Option<(PageId, PageRef)>> {
        let mut state = self.state.lock();

        // Fail fast before burning a page ID: with the free list empty and
        // every frame pinned, the replacer has nothing to offer either.
        if state.free_list.is_empty() && self.frames.iter().all(|f| f.pin_count() > 0) {
            debug!(instance = self.instance_index, "new_page with every frame pinned");
            return Ok(None);
        }

        let page_id = Self::allocate_page_id(&mut state, self.num_instances);
        debug_assert_eq!(
            page_id.shard_of(self.num_instances),
            self.instance_index,
            "allocator produced page {page_id} outside this instance's residue class"
        );

        let Some(frame_id) = self.find_replacement(&mut state)? else {
            return Ok(None);
        };

        let frame = &self.frames[frame_id.index()];
        frame.data().write().fill(0);
        frame.set_page_id(page_id);
        frame.set_pin_count(1);
        frame.clear_dirty();
        state.page_table.insert(page_id, frame_id);
        self.replacer.pin(frame_id);

        // Reserve the block on disk so a cold fetch of this ID succeeds.
        if let Err(e) = self.disk_manager.write_page(page_id, &frame.data().read()) {
            state.page_table.remove(&page_id);
            frame.reset();
            state.free_list.push_back(frame_id);
            return Err(e);
        }

        trace!(page_id = %page_id, frame_id = %frame_id, "allocated new page");
        Ok(Some((page_id, Arc::clone(frame))))
    }

    /// Releases one pin on the page, marking it dirty if the caller wrote.
    ///
    /// Returns `false` if the page is not resident or its pin count was
    /// already zero; the count never goes negative. The dirty flag is
    /// sticky: once set it stays until a flush or eviction writes the
    /// bytes back.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        debug_assert!(
            !page_id.is_valid() || page_id.shard_of(self.num_instances) == self.instance_index,
            "page {page_id} routed to wrong instance"
        );

        let state = self.state.lock();
        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return false;
        };

        let frame = &self.frames[frame_id.index()];
        if is_dirty {
            frame.mark_dirty();
        }

        if frame.pin_count() == 0 {
            // Double unpin: keep the frame evictable but report the error.
            self.replacer.unpin(frame_id);
            return false;
        }

        if frame.unpin() == 0 {
            self.replacer.unpin(frame_id);
            trace!(page_id = %page_id, frame_id = %frame_id, "frame now evictable");
        }
        true
    }

    /// Writes the page's bytes through the disk manager.
    ///
    /// Returns `Ok(false)` if the page is not resident. On success the
    /// dirty flag is cleared, letting a later eviction skip the writeback.
    pub fn flush_page(&self, page_id: PageId) -> FerroResult<bool> {
        if !page_id.is_valid() {
            return Ok(false);
        }
        debug_assert_eq!(
            page_id.shard_of(self.num_instances),
            self.instance_index,
            "page {page_id} routed to wrong instance"
        );

        let state = self.state.lock();
        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return Ok(false);
        };

        let frame = &self.frames[frame_id.index()];
        self.disk_manager.write_page(page_id, &frame.data().read())?;
        frame.clear_dirty();
        self.stats.record_flush();
        Ok(true)
    }

    /// Writes every resident page through the disk manager.
    pub fn flush_all(&self) -> FerroResult<()> {
        let state = self.state.lock();
        for (&page_id, &frame_id) in &state.page_table {
            let frame = &self.frames[frame_id.index()];
            self.disk_manager.write_page(page_id, &frame.data().read())?;
            frame.clear_dirty();
            self.stats.record_flush();
        }
        Ok(())
    }

    /// Removes the page from the pool and deallocates it on disk.
    ///
    /// Returns `Ok(true)` if the page is absent (absent means deleted) or
    /// was removed; `Ok(false)` if it is pinned. A dirty page is written
    /// back before the block is deallocated.
    pub fn delete_page(&self, page_id: PageId) -> FerroResult<bool> {
        if !page_id.is_valid() {
            return Ok(true);
        }
        debug_assert_eq!(
            page_id.shard_of(self.num_instances),
            self.instance_index,
            "page {page_id} routed to wrong instance"
        );

        let mut state = self.state.lock();
        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return Ok(true);
        };

        let frame = &self.frames[frame_id.index()];
        if frame.pin_count() > 0 {
            return Ok(false);
        }

        if frame.is_dirty() {
            self.disk_manager.write_page(page_id, &frame.data().read())?;
            frame.clear_dirty();
            self.stats.record_writeback();
        }
        self.disk_manager.deallocate_page(page_id)?;

        state.page_table.remove(&page_id);
        self.replacer.pin(frame_id);
        frame.reset();
        state.free_list.push_back(frame_id);
        debug!(page_id = %page_id, frame_id = %frame_id, "deleted page");
        Ok(true)
    }

    /// Claims a frame for a new occupant: free list first, else the LRU
    /// victim (written back if dirty, table entry removed).
    ///
    /// On success the frame is owned by the caller and absent from the
    /// free list, the page table, and the replacer; its metadata still
    /// reflects the previous occupant until the caller overwrites it. If
    /// the victim's writeback fails, the victim stays resident and
    /// evictable and the error propagates.
    fn find_replacement(&self, state: &mut PoolState) -> FerroResult<Option<FrameId>> {
        if let Some(frame_id) = state.free_list.pop_front() {
            return Ok(Some(frame_id));
        }

        let Some(frame_id) = self.replacer.victim() else {
            return Ok(None);
        };

        // The frame records its own occupant; no page-table scan needed.
        let frame = &self.frames[frame_id.index()];
        let old_page_id = frame.page_id();
        debug_assert!(old_page_id.is_valid(), "replacer surrendered a free frame");

        if frame.is_dirty() {
            if let Err(e) = self.disk_manager.write_page(old_page_id, &frame.data().read()) {
                // Roll back: the old page stays resident and evictable.
                self.replacer.unpin(frame_id);
                return Err(e);
            }
            frame.clear_dirty();
            self.stats.record_writeback();
        }

        state.page_table.remove(&old_page_id);
        self.stats.record_eviction();
        debug!(evicted = %old_page_id, frame_id = %frame_id, "evicted page");
        Ok(Some(frame_id))
    }

    /// Advances the per-instance allocator: IDs start at the instance
    /// index and stride by the instance count.
    fn allocate_page_id(state: &mut PoolState, num_instances: usize) -> PageId {
        let page_id = PageId::new(state.next_page_id);
        state.next_page_id += num_instances as u64;
        page_id
    }
}

impl std::fmt::Debug for BufferPoolInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPoolInstance")
            .field("pool_size", &self.pool_size)
            .field("instance_index", &self.instance_index)
            .field("num_instances", &self.num_instances)
            .finish()
    }
}
