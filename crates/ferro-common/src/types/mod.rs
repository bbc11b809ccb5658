//! Core types for FerroDB.

mod ids;

pub use ids::{FrameId, PageId};

use crate::constants::PAGE_SIZE;

/// The raw byte buffer of one page.
///
/// Disk manager and buffer pool exchange page contents exclusively through
/// buffers of this exact size.
pub type PageData = [u8; PAGE_SIZE];
