//! Core identifier types for FerroDB.
//!
//! These types provide type-safe wrappers around numeric identifiers,
//! preventing accidental misuse of different ID types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page identifier - the logical address of a page on disk.
///
/// A page-id outlives any frame the page happens to occupy: it names the
/// on-disk block, while frames name in-memory slots.
///
/// # Example
///
/// ```rust
/// use ferro_common::types::PageId;
///
/// let page = PageId::new(42);
/// assert_eq!(page.as_u64(), 42);
/// assert!(!PageId::INVALID.is_valid());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PageId(u64);

impl PageId {
    /// Invalid page ID constant, used as a sentinel value.
    ///
    /// Allocators never return this value; operations against it fail fast
    /// with their miss result.
    pub const INVALID: Self = Self(u64::MAX);

    /// Creates a new `PageId` from a raw u64 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Checks if this is a valid page ID.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }

    /// Returns the residue class of this page ID modulo the shard count.
    ///
    /// A sharded pool owns a page iff this equals the instance index.
    #[inline]
    #[must_use]
    pub const fn shard_of(self, num_instances: usize) -> usize {
        (self.0 % num_instances as u64) as usize
    }
}

impl fmt::Debug for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "PageId(INVALID)")
        } else {
            write!(f, "PageId({})", self.0)
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PageId {
    #[inline]
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<PageId> for u64 {
    #[inline]
    fn from(id: PageId) -> Self {
        id.0
    }
}

/// Frame identifier - the index of a slot in a buffer pool instance.
///
/// Frame IDs are dense: every instance owns frames `0..pool_size`, and a
/// frame ID indexes directly into the instance's frame array. Frame IDs
/// are meaningful only within one instance.
///
/// # Example
///
/// ```rust
/// use ferro_common::types::FrameId;
///
/// let frame = FrameId::new(3);
/// assert_eq!(frame.index(), 3);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct FrameId(u32);

impl FrameId {
    /// Creates a new `FrameId` from a raw u32 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw u32 value.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the frame-array index for this frame.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameId({})", self.0)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FrameId {
    #[inline]
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

impl From<FrameId> for u32 {
    #[inline]
    fn from(id: FrameId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id() {
        let page = PageId::new(42);
        assert_eq!(page.as_u64(), 42);
        assert!(page.is_valid());
        assert!(!PageId::INVALID.is_valid());
    }

    #[test]
    fn test_page_id_shard_of() {
        assert_eq!(PageId::new(0).shard_of(4), 0);
        assert_eq!(PageId::new(5).shard_of(4), 1);
        assert_eq!(PageId::new(7).shard_of(4), 3);
        assert_eq!(PageId::new(12).shard_of(1), 0);
    }

    #[test]
    fn test_page_id_debug() {
        assert_eq!(format!("{:?}", PageId::new(7)), "PageId(7)");
        assert_eq!(format!("{:?}", PageId::INVALID), "PageId(INVALID)");
    }

    #[test]
    fn test_frame_id() {
        let frame = FrameId::new(5);
        assert_eq!(frame.as_u32(), 5);
        assert_eq!(frame.index(), 5);
    }

    #[test]
    fn test_ordering() {
        assert!(PageId::new(1) < PageId::new(2));
        assert!(FrameId::new(1) < FrameId::new(2));
    }
}
