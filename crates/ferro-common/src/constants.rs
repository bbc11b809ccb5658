//! System-wide constants for FerroDB.
//!
//! This module defines constants used across the buffer and storage
//! subsystems.

// =============================================================================
// Page Constants
// =============================================================================

/// Size of a database page in bytes (4 KB).
///
/// Every frame in the buffer pool and every block handed to the disk
/// manager is exactly this size. It matches the typical OS page size.
pub const PAGE_SIZE: usize = 4 * 1024;

// =============================================================================
// Buffer Pool Constants
// =============================================================================

/// Default number of frames per buffer pool instance.
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Default number of buffer pool instances (shards).
///
/// The page-id space is partitioned by residue class across instances, so
/// each instance serializes only its own slice of the traffic.
pub const DEFAULT_POOL_INSTANCES: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size() {
        // Page size should be a power of 2 and large enough for real data
        assert!(PAGE_SIZE.is_power_of_two());
        assert!(PAGE_SIZE >= 4096);
    }

    #[test]
    fn test_pool_defaults() {
        assert!(DEFAULT_POOL_SIZE > 0);
        assert!(DEFAULT_POOL_INSTANCES > 0);
    }
}
