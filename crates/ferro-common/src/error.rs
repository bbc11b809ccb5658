//! Error handling for FerroDB.
//!
//! This module provides a unified error type and result alias used across
//! all FerroDB components.
//!
//! Misses, saturation, and in-use conditions are not errors: buffer pool
//! operations report them through their `Option`/`bool` return values.
//! `FerroError` is reserved for conditions the pool cannot express that
//! way, chiefly I/O failures propagated from the disk manager.

use thiserror::Error;

use crate::types::PageId;

/// Result type alias for FerroDB operations.
pub type FerroResult<T> = std::result::Result<T, FerroError>;

/// The main error type for FerroDB.
#[derive(Debug, Error)]
pub enum FerroError {
    /// I/O error from the underlying system.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A disk operation was attempted against the invalid sentinel id.
    #[error("invalid page id: {page_id}")]
    InvalidPageId {
        /// The offending page ID.
        page_id: PageId,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },
}

impl FerroError {
    /// Creates an invalid-configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true if this error originated in the I/O layer.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
