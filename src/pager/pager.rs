//! Pager - the page cache between node buffers and the table file.
//!
//! The [`Pager`] provides:
//! - One cached buffer per page number, loaded lazily
//! - Page-number to file-offset translation (through [`DiskManager`])
//! - Append-only page allocation
//! - Write-back of every cached page on close

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::common::{Error, PageId, Result};
use crate::pager::{PagerStats, StatsSnapshot};
use crate::storage::page::Page;
use crate::storage::DiskManager;

/// Shared handle to a cached page.
///
/// Every handle for a page number points at the same buffer, so a write
/// through one handle is visible through all of them. Handles stay valid
/// after later allocations, but callers should reacquire node views after
/// any insert, since cells shift in place.
pub type PageRef = Arc<RwLock<Page>>;

/// Owns the table file and every cached page buffer.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────┐
/// │                        Pager                         │
/// │  ┌──────────────────────────────┐  ┌──────────────┐  │
/// │  │ pages: Vec<Option<PageRef>>  │  │ DiskManager  │  │
/// │  │ [P0] [P1] [None] [P3] ...    │─▶│ page N at    │  │
/// │  └──────────────────────────────┘  │ N×PAGE_SIZE  │  │
/// │   num_pages (high-water mark)      └──────────────┘  │
/// └──────────────────────────────────────────────────────┘
/// ```
///
/// The slot table only grows. Pages are never evicted before close and
/// page numbers are never reused.
///
/// # Thread Safety
/// Single-threaded: all methods take `&mut self`. The `RwLock` inside each
/// [`PageRef`] lets the B-tree hold two different pages at once during a
/// split; it never sees contention.
pub struct Pager {
    /// Handles all file I/O.
    disk: DiskManager,

    /// Cached buffers indexed by page number (`None` = not loaded yet).
    pages: Vec<Option<PageRef>>,

    /// Pages in the table, on disk or created in memory.
    num_pages: u32,

    /// Fixed page capacity.
    max_pages: u32,

    stats: PagerStats,
}

impl Pager {
    /// Open (or create) a table file.
    ///
    /// `num_pages` starts at the number of whole pages in the file.
    ///
    /// # Errors
    /// - `Error::Io` if the file cannot be opened
    /// - `Error::PartialPage` if the file has a trailing partial page
    pub fn open<P: AsRef<Path>>(path: P, max_pages: u32) -> Result<Self> {
        let disk = DiskManager::open(path)?;
        let num_pages = disk.page_count();

        debug!(
            file_length = disk.file_length(),
            num_pages, max_pages, "pager opened"
        );

        Ok(Self {
            disk,
            pages: Vec::new(),
            num_pages,
            max_pages,
            stats: PagerStats::new(),
        })
    }

    /// Get a handle to a page, loading or creating it on a cache miss.
    ///
    /// On a miss the page starts zeroed. If it lies within the on-disk
    /// extent its bytes are read from the file (a short read leaves the
    /// tail zeroed). Otherwise it is a new page and `num_pages` advances
    /// to `page_id + 1`.
    ///
    /// # Errors
    /// - `Error::PageOutOfRange` if `page_id` is at or beyond `max_pages`
    /// - `Error::Io` if the read fails
    pub fn get_page(&mut self, page_id: PageId) -> Result<PageRef> {
        if page_id.0 >= self.max_pages {
            return Err(Error::PageOutOfRange {
                page_id,
                max_pages: self.max_pages,
            });
        }

        if let Some(Some(page)) = self.pages.get(page_id.slot()) {
            PagerStats::bump(&self.stats.cache_hits);
            return Ok(Arc::clone(page));
        }

        PagerStats::bump(&self.stats.cache_misses);

        let mut page = Page::new();
        if page_id.0 < self.disk.page_count() {
            let bytes_read = self.disk.read_page(page_id, &mut page)?;
            PagerStats::bump(&self.stats.pages_read);
            trace!(%page_id, bytes_read, "page loaded from disk");
        } else if page_id.0 >= self.num_pages {
            self.num_pages = page_id.0 + 1;
            PagerStats::bump(&self.stats.pages_allocated);
            debug!(%page_id, num_pages = self.num_pages, "new page created");
        }

        if self.pages.len() <= page_id.slot() {
            self.pages.resize(page_id.slot() + 1, None);
        }

        let page = Arc::new(RwLock::new(page));
        self.pages[page_id.slot()] = Some(Arc::clone(&page));
        Ok(page)
    }

    /// Write a cached page to its file offset.
    ///
    /// # Errors
    /// - `Error::PageNotCached` if the page was never loaded (a bug in the caller)
    /// - `Error::Io` if the write fails or is short
    pub fn flush(&mut self, page_id: PageId) -> Result<()> {
        let page = match self.pages.get(page_id.slot()) {
            Some(Some(page)) => Arc::clone(page),
            _ => return Err(Error::PageNotCached(page_id)),
        };

        self.disk.write_page(page_id, &page.read())?;
        PagerStats::bump(&self.stats.pages_written);
        trace!(%page_id, "page flushed");
        Ok(())
    }

    /// Flush every cached page, in page-number order.
    ///
    /// Returns the number of pages written.
    pub fn flush_all(&mut self) -> Result<usize> {
        let cached: Vec<PageId> = self.cached_page_ids().collect();
        for &page_id in &cached {
            self.flush(page_id)?;
        }
        Ok(cached.len())
    }

    /// Flush everything, optionally `fsync`, and release the file.
    pub fn close(mut self, sync: bool) -> Result<()> {
        let written = self.flush_all()?;
        if sync {
            self.disk.sync()?;
        }

        debug!(
            pages_written = written,
            file_length = self.disk.file_length(),
            "pager closed"
        );
        Ok(())
    }

    /// Page number the next allocation will use.
    ///
    /// Until free pages are recycled, new pages always go onto the end of
    /// the file.
    #[inline]
    pub fn allocate_unused_page_id(&self) -> PageId {
        PageId::new(self.num_pages)
    }

    /// Current page count (high-water mark).
    #[inline]
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Fixed page capacity.
    #[inline]
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Whether `page_id` currently has a cached buffer.
    pub fn is_cached(&self, page_id: PageId) -> bool {
        matches!(self.pages.get(page_id.slot()), Some(Some(_)))
    }

    /// Length of the table file as last written.
    pub fn file_length(&self) -> u64 {
        self.disk.file_length()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn cached_page_ids(&self) -> impl Iterator<Item = PageId> + '_ {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| PageId::new(i as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::{PAGE_SIZE, TABLE_MAX_PAGES};
    use tempfile::tempdir;

    fn open_pager(dir: &tempfile::TempDir) -> Pager {
        Pager::open(dir.path().join("test.db"), TABLE_MAX_PAGES).unwrap()
    }

    #[test]
    fn test_open_empty_file() {
        let dir = tempdir().unwrap();
        let pager = open_pager(&dir);

        assert_eq!(pager.num_pages(), 0);
        assert_eq!(pager.allocate_unused_page_id(), PageId::new(0));
    }

    #[test]
    fn test_get_page_returns_same_buffer() {
        let dir = tempdir().unwrap();
        let mut pager = open_pager(&dir);

        let a = pager.get_page(PageId::new(0)).unwrap();
        let b = pager.get_page(PageId::new(0)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        a.write().as_mut_slice()[7] = 0x5A;
        assert_eq!(b.read().as_slice()[7], 0x5A);

        let stats = pager.stats();
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.cache_hits, 1);
    }

    #[test]
    fn test_get_page_at_high_water_mark_extends_by_one() {
        let dir = tempdir().unwrap();
        let mut pager = open_pager(&dir);

        pager.get_page(PageId::new(0)).unwrap();
        assert_eq!(pager.num_pages(), 1);

        let next = pager.allocate_unused_page_id();
        pager.get_page(next).unwrap();
        assert_eq!(pager.num_pages(), 2);
    }

    #[test]
    fn test_get_page_out_of_range() {
        let dir = tempdir().unwrap();
        let mut pager = Pager::open(dir.path().join("test.db"), 4).unwrap();

        assert!(pager.get_page(PageId::new(3)).is_ok());
        match pager.get_page(PageId::new(4)) {
            Err(Error::PageOutOfRange { page_id, max_pages }) => {
                assert_eq!(page_id, PageId::new(4));
                assert_eq!(max_pages, 4);
            }
            other => panic!("expected PageOutOfRange, got {:?}", other.map(|_| ())),
        }
        assert_eq!(pager.num_pages(), 4);
    }

    #[test]
    fn test_flush_uncached_page_fails() {
        let dir = tempdir().unwrap();
        let mut pager = open_pager(&dir);

        assert!(matches!(
            pager.flush(PageId::new(0)),
            Err(Error::PageNotCached(_))
        ));
    }

    #[test]
    fn test_close_writes_back_and_reopen_reads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut pager = Pager::open(&path, TABLE_MAX_PAGES).unwrap();
            pager.get_page(PageId::new(0)).unwrap().write().write_u32(100, 11);
            pager.get_page(PageId::new(1)).unwrap().write().write_u32(100, 22);
            pager.close(true).unwrap();
        }

        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            2 * PAGE_SIZE as u64
        );

        let mut pager = Pager::open(&path, TABLE_MAX_PAGES).unwrap();
        assert_eq!(pager.num_pages(), 2);
        assert_eq!(pager.get_page(PageId::new(1)).unwrap().read().read_u32(100), 22);
        assert_eq!(pager.get_page(PageId::new(0)).unwrap().read().read_u32(100), 11);
        assert_eq!(pager.stats().pages_read, 2);
    }

    #[test]
    fn test_only_cached_pages_are_flushed() {
        let dir = tempdir().unwrap();
        let mut pager = open_pager(&dir);

        pager.get_page(PageId::new(0)).unwrap();
        pager.get_page(PageId::new(2)).unwrap();

        assert!(pager.is_cached(PageId::new(2)));
        assert!(!pager.is_cached(PageId::new(1)));
        assert_eq!(pager.flush_all().unwrap(), 2);
        assert_eq!(pager.stats().pages_written, 2);
    }
}
