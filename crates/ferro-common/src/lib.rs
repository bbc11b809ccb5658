//! # ferro-common
//!
//! Common types, errors, and configuration for FerroDB.
//!
//! This crate provides the foundational types shared by every FerroDB
//! component. It includes:
//!
//! - **Types**: Core identifiers (`PageId`, `FrameId`) and the page buffer
//!   alias
//! - **Errors**: Unified error handling with `FerroError`
//! - **Config**: Buffer pool configuration
//! - **Constants**: System-wide constants and limits
//!
//! ## Example
//!
//! ```rust
//! use ferro_common::types::{FrameId, PageId};
//! use ferro_common::error::FerroResult;
//!
//! fn example() -> FerroResult<()> {
//!     let page_id = PageId::new(42);
//!     let frame_id = FrameId::new(0);
//!     assert!(page_id.is_valid());
//!     assert_eq!(frame_id.index(), 0);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items at the crate root
pub use config::BufferPoolConfig;
pub use constants::*;
pub use error::{FerroError, FerroResult};
pub use types::{FrameId, PageData, PageId};
