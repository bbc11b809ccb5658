//! Buffer pool configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_POOL_INSTANCES, DEFAULT_POOL_SIZE};
use crate::error::{FerroError, FerroResult};

/// Configuration for a (possibly sharded) buffer pool.
///
/// # Example
///
/// ```rust
/// use ferro_common::config::BufferPoolConfig;
///
/// let config = BufferPoolConfig::default();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferPoolConfig {
    /// Number of frames per pool instance.
    /// Default: 64
    pub pool_size: usize,

    /// Number of independent pool instances (shards).
    ///
    /// The page-id space is partitioned across instances by residue class
    /// modulo this count.
    /// Default: 4
    pub num_instances: usize,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            num_instances: DEFAULT_POOL_INSTANCES,
        }
    }
}

impl BufferPoolConfig {
    /// Creates a configuration with the given pool size and instance count.
    #[must_use]
    pub fn new(pool_size: usize, num_instances: usize) -> Self {
        Self {
            pool_size,
            num_instances,
        }
    }

    /// Creates a minimal configuration for testing.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            pool_size: 8,
            num_instances: 2,
        }
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> FerroResult<()> {
        if self.pool_size == 0 {
            return Err(FerroError::invalid_config("pool_size must be positive"));
        }
        if self.num_instances == 0 {
            return Err(FerroError::invalid_config(
                "num_instances must be positive",
            ));
        }
        Ok(())
    }

    /// Returns the total number of frames across all instances.
    #[must_use]
    pub const fn total_frames(&self) -> usize {
        self.pool_size * self.num_instances
    }
}
