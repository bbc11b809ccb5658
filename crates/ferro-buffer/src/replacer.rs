//! LRU frame replacer.
//!
//! The replacer is the pool's eviction oracle: it tracks the frames whose
//! pin count has dropped to zero and, on demand, surrenders the one whose
//! unpin happened longest ago. It holds frame IDs only; keeping the
//! candidate set consistent with residency is entirely the pool's job.

use std::collections::HashMap;
use std::ptr::NonNull;

use parking_lot::Mutex;

use ferro_common::types::FrameId;

/// A node in the recency list.
struct Node {
    frame_id: FrameId,
    prev: Option<NonNull<Node>>,
    next: Option<NonNull<Node>>,
}

impl Node {
    fn new(frame_id: FrameId) -> Self {
        Self {
            frame_id,
            prev: None,
            next: None,
        }
    }
}

/// The recency list plus its index: head is the most recently unpinned
/// frame, tail is the victim.
struct LruList {
    /// Maximum number of candidates; equals the pool size.
    capacity: usize,
    /// Map from frame ID to node pointer.
    map: HashMap<FrameId, NonNull<Node>>,
    /// Most recently made-evictable end.
    head: Option<NonNull<Node>>,
    /// Victim end.
    tail: Option<NonNull<Node>>,
}

// Safety: the list owns its nodes outright and is only reached through the
// replacer's mutex.
unsafe impl Send for LruList {}

impl LruList {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    fn push_front(&mut self, node_ptr: NonNull<Node>) {
        unsafe {
            (*node_ptr.as_ptr()).prev = None;
            (*node_ptr.as_ptr()).next = self.head;

            if let Some(head) = self.head {
                (*head.as_ptr()).prev = Some(node_ptr);
            }

            self.head = Some(node_ptr);

            if self.tail.is_none() {
                self.tail = Some(node_ptr);
            }
        }
    }

    fn unlink(&mut self, node_ptr: NonNull<Node>) {
        unsafe {
            let prev = (*node_ptr.as_ptr()).prev;
            let next = (*node_ptr.as_ptr()).next;

            if let Some(prev) = prev {
                (*prev.as_ptr()).next = next;
            } else {
                self.head = next;
            }

            if let Some(next) = next {
                (*next.as_ptr()).prev = prev;
            } else {
                self.tail = prev;
            }
        }
    }
}

impl Drop for LruList {
    fn drop(&mut self) {
        let mut current = self.head;
        while let Some(node_ptr) = current {
            unsafe {
                current = (*node_ptr.as_ptr()).next;
                drop(Box::from_raw(node_ptr.as_ptr()));
            }
        }
    }
}

/// Thread-safe LRU replacer over frame IDs.
///
/// All operations are O(1). The victim is the least recently unpinned
/// candidate; pinning removes a candidate, and a later unpin re-inserts it
/// at the recent end, resetting its recency.
///
/// # Example
///
/// ```rust
/// use ferro_buffer::LruReplacer;
/// use ferro_common::types::FrameId;
///
/// let replacer = LruReplacer::new(3);
/// replacer.unpin(FrameId::new(0));
/// replacer.unpin(FrameId::new(1));
/// assert_eq!(replacer.victim(), Some(FrameId::new(0)));
/// ```
pub struct LruReplacer {
    inner: Mutex<LruList>,
}

impl LruReplacer {
    /// Creates a replacer that tracks at most `capacity` candidates.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruList::new(capacity)),
        }
    }

    /// Removes and returns the least recently unpinned frame, or `None`
    /// if there are no candidates.
    pub fn victim(&self) -> Option<FrameId> {
        let mut inner = self.inner.lock();
        let tail = inner.tail?;
        inner.unlink(tail);
        // Safety: we just unlinked the node; the map entry is its only
        // other reference.
        let node = unsafe { Box::from_raw(tail.as_ptr()) };
        inner.map.remove(&node.frame_id);
        Some(node.frame_id)
    }

    /// Removes the frame from the candidate set; no-op if absent.
    ///
    /// Called when a frame gains a pin (or is deleted) and must no longer
    /// be evictable.
    pub fn pin(&self, frame_id: FrameId) {
        let mut inner = self.inner.lock();
        if let Some(node_ptr) = inner.map.remove(&frame_id) {
            inner.unlink(node_ptr);
            // Safety: removed from both the list and the map.
            unsafe { drop(Box::from_raw(node_ptr.as_ptr())) };
        }
    }

    /// Inserts the frame at the most-recent end; no-op if already present.
    ///
    /// Called when a frame's pin count drops to zero.
    pub fn unpin(&self, frame_id: FrameId) {
        let mut inner = self.inner.lock();
        if inner.map.contains_key(&frame_id) {
            return;
        }
        // A candidate must be a resident, unpinned frame; more candidates
        // than frames means the pool above has corrupted its bookkeeping.
        debug_assert!(
            inner.map.len() < inner.capacity,
            "replacer overflow: {} candidates, capacity {}",
            inner.map.len(),
            inner.capacity
        );

        let node = Box::new(Node::new(frame_id));
        let node_ptr = NonNull::from(Box::leak(node));
        inner.push_front(node_ptr);
        inner.map.insert(frame_id, node_ptr);
    }

    /// Returns the number of eviction candidates.
    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    /// Returns true if there are no eviction candidates.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for LruReplacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruReplacer")
            .field("len", &self.len())
            .finish()
    }
}
