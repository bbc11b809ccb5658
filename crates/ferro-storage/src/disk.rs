//! The disk manager contract.

use ferro_common::error::FerroResult;
use ferro_common::types::{PageData, PageId};

/// Block-addressable page I/O.
///
/// A disk manager stores pages of exactly `PAGE_SIZE` bytes, addressed by
/// page ID. Implementations are internally synchronized: every method takes
/// `&self` and individual page operations are atomic with respect to each
/// other, so a single manager can be shared by all buffer pool instances.
///
/// Reading a page that was never written yields a zeroed buffer rather
/// than an error; higher layers treat such pages as uninitialized.
pub trait DiskManager: Send + Sync {
    /// Reads the page's bytes into `buf`.
    fn read_page(&self, page_id: PageId, buf: &mut PageData) -> FerroResult<()>;

    /// Writes `buf` as the page's bytes.
    fn write_page(&self, page_id: PageId, buf: &PageData) -> FerroResult<()>;

    /// Marks the page's on-disk block as deallocated.
    fn deallocate_page(&self, page_id: PageId) -> FerroResult<()>;
}
