//! Buffer pool statistics for monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for one buffer pool instance.
#[derive(Debug, Default)]
pub struct PoolStats {
    /// Fetches served from a resident frame.
    hits: AtomicU64,
    /// Fetches that had to go to disk.
    misses: AtomicU64,
    /// Frames evicted to make room.
    evictions: AtomicU64,
    /// Dirty frames written back during eviction or deletion.
    writebacks: AtomicU64,
    /// Explicit page flushes.
    flushes: AtomicU64,
}

impl PoolStats {
    /// Creates new statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fetch hit.
    #[inline]
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a fetch miss.
    #[inline]
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an eviction.
    #[inline]
    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a dirty writeback.
    #[inline]
    pub(crate) fn record_writeback(&self) {
        self.writebacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an explicit flush.
    #[inline]
    pub(crate) fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Folds another instance's counters into this one.
    pub(crate) fn merge(&self, other: &PoolStats) {
        self.hits.fetch_add(other.hits(), Ordering::Relaxed);
        self.misses.fetch_add(other.misses(), Ordering::Relaxed);
        self.evictions.fetch_add(other.evictions(), Ordering::Relaxed);
        self.writebacks
            .fetch_add(other.writebacks(), Ordering::Relaxed);
        self.flushes.fetch_add(other.flushes(), Ordering::Relaxed);
    }

    /// Returns fetch hits.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns fetch misses.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Returns evictions.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Returns dirty writebacks.
    pub fn writebacks(&self) -> u64 {
        self.writebacks.load(Ordering::Relaxed)
    }

    /// Returns explicit flushes.
    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    /// Returns the fetch hit ratio (0.0 to 1.0).
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits() + self.misses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }
}

impl Clone for PoolStats {
    fn clone(&self) -> Self {
        Self {
            hits: AtomicU64::new(self.hits()),
            misses: AtomicU64::new(self.misses()),
            evictions: AtomicU64::new(self.evictions()),
            writebacks: AtomicU64::new(self.writebacks()),
            flushes: AtomicU64::new(self.flushes()),
        }
    }
}

impl std::fmt::Display for PoolStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PoolStats {{ hits: {}, misses: {}, hit_ratio: {:.2}%, evictions: {}, writebacks: {}, flushes: {} }}",
            self.hits(),
            self.misses(),
            self.hit_ratio() * 100.0,
            self.evictions(),
            self.writebacks(),
            self.flushes()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_stats() {
        let stats = PoolStats::new();

        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_eviction();

        assert_eq!(stats.hits(), 2);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.evictions(), 1);
        assert!((stats.hit_ratio() - 2.0 / 3.0).abs() < 0.001);
    }

    #[test]
    fn test_merge() {
        let a = PoolStats::new();
        let b = PoolStats::new();
        a.record_hit();
        b.record_hit();
        b.record_miss();

        a.merge(&b);
        assert_eq!(a.hits(), 2);
        assert_eq!(a.misses(), 1);
    }

    #[test]
    fn test_empty_hit_ratio() {
        let stats = PoolStats::new();
        assert_eq!(stats.hit_ratio(), 0.0);
    }
}
