//! The parallel (sharded) buffer pool.
//!
//! A single global latch would serialize all disk I/O behind one mutex.
//! The parallel pool instead partitions the page-id space by residue class
//! and gives each class its own independently latched instance: point
//! operations route to the owning instance with no cross-shard
//! coordination, and allocation rotates a starting index so new pages
//! spread across shards.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use ferro_common::config::BufferPoolConfig;
use ferro_common::error::FerroResult;
use ferro_common::types::PageId;
use ferro_storage::{DiskManager, LogManager};

use crate::page::PageRef;
use crate::pool::BufferPoolInstance;
use crate::stats::PoolStats;

/// A buffer pool composed of N independent instances.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use ferro_buffer::ParallelBufferPool;
/// use ferro_common::config::BufferPoolConfig;
/// use ferro_storage::MemDiskManager;
///
/// let config = BufferPoolConfig::new(2, 4);
/// let pool = ParallelBufferPool::new(&config, Arc::new(MemDiskManager::new()), None).unwrap();
///
/// let (page_id, _page) = pool.new_page().unwrap().unwrap();
/// assert!(pool.unpin_page(page_id, false));
/// ```
pub struct ParallelBufferPool {
    /// The instances, in residue-class order: `instances[i]` owns every
    /// page ID congruent to `i`.
    instances: Vec<BufferPoolInstance>,
    /// Where the next allocation cycle starts; guarded so concurrent
    /// `new_page` calls rotate fairly.
    start_index: Mutex<usize>,
}

impl ParallelBufferPool {
    /// Creates `config.num_instances` instances of `config.pool_size`
    /// frames each, sharing one disk manager.
    pub fn new(
        config: &BufferPoolConfig,
        disk_manager: Arc<dyn DiskManager>,
        log_manager: Option<Arc<LogManager>>,
    ) -> FerroResult<Self> {
        config.validate()?;

        let instances = (0..config.num_instances)
            .map(|i| {
                BufferPoolInstance::new_sharded(
                    config.pool_size,
                    config.num_instances,
                    i,
                    Arc::clone(&disk_manager),
                    log_manager.clone(),
                )
            })
            .collect();

        Ok(Self {
            instances,
            start_index: Mutex::new(0),
        })
    }

    /// Returns the number of instances.
    #[must_use]
    pub fn num_instances(&self) -> usize {
        self.instances.len()
    }

    /// Returns the aggregate frame count across all instances.
    #[must_use]
    pub fn total_frames(&self) -> usize {
        self.instances.iter().map(BufferPoolInstance::pool_size).sum()
    }

    /// Returns the instance owning the page's residue class.
    #[must_use]
    pub fn instance_for(&self, page_id: PageId) -> &BufferPoolInstance {
        &self.instances[page_id.shard_of(self.instances.len())]
    }

    /// Fetches the page from its owning instance.
    pub fn fetch_page(&self, page_id: PageId) -> FerroResult<Option<PageRef>> {
        if !page_id.is_valid() {
            return Ok(None);
        }
        self.instance_for(page_id).fetch_page(page_id)
    }

    /// Allocates a new page, trying each instance in cyclic order.
    ///
    /// The scan starts at the rotating index and advances it after every
    /// attempt, success or failure, so bursty allocation still spreads
    /// across shards. Returns `Ok(None)` only after a full cycle of
    /// saturated instances.
    pub fn new_page(&self) -> FerroResult<Option<(PageId, PageRef)>> {
        let mut start_index = self.start_index.lock();
        for _ in 0..self.instances.len() {
            let index = *start_index;
            *start_index = (*start_index + 1) % self.instances.len();

            if let Some((page_id, page)) = self.instances[index].new_page()? {
                debug!(instance = index, page_id = %page_id, "allocated page");
                return Ok(Some((page_id, page)));
            }
        }
        debug!("every instance saturated, no page allocated");
        Ok(None)
    }

    /// Unpins the page in its owning instance.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        if !page_id.is_valid() {
            return false;
        }
        self.instance_for(page_id).unpin_page(page_id, is_dirty)
    }

    /// Flushes the page from its owning instance.
    pub fn flush_page(&self, page_id: PageId) -> FerroResult<bool> {
        if !page_id.is_valid() {
            return Ok(false);
        }
        self.instance_for(page_id).flush_page(page_id)
    }

    /// Deletes the page from its owning instance.
    pub fn delete_page(&self, page_id: PageId) -> FerroResult<bool> {
        if !page_id.is_valid() {
            return Ok(true);
        }
        self.instance_for(page_id).delete_page(page_id)
    }

    /// Flushes every resident page in every instance.
    ///
    /// Instances are flushed in turn; this is not an atomic snapshot.
    pub fn flush_all(&self) -> FerroResult<()> {
        for instance in &self.instances {
            instance.flush_all()?;
        }
        Ok(())
    }

    /// Returns statistics summed across all instances.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let total = PoolStats::new();
        for instance in &self.instances {
            total.merge(instance.stats());
        }
        total
    }
}

impl std::fmt::Debug for ParallelBufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelBufferPool")
            .field("num_instances", &self.num_instances())
            .field("total_frames", &self.total_frames())
            .finish()
    }
}
