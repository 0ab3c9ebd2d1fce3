//! Disk Manager - low-level file I/O for table pages.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Opening (or creating) the table file
//! - Reading and writing whole pages at their offsets
//! - Tracking the on-disk extent

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;

/// Manages disk I/O for a single table file.
///
/// # File Layout
/// The table is stored as a single file with pages laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (root)  │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Only whole pages are valid. A file whose length is not a multiple of
/// `PAGE_SIZE` is rejected at open.
///
/// # Thread Safety
/// `DiskManager` is **single-threaded** and owned by exactly one `Pager`.
pub struct DiskManager {
    file: File,
    /// Current length of the file in bytes.
    file_length: u64,
}

impl DiskManager {
    /// Open a table file read-write, creating it if it does not exist.
    ///
    /// Existing contents are never truncated. New files are created with
    /// owner read/write permission only.
    ///
    /// # Errors
    /// - `Error::Io` if the file cannot be opened or created
    /// - `Error::PartialPage` if the file length is not a whole number of pages
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = options.open(path)?;
        let file_length = file.metadata()?.len();

        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(Error::PartialPage { file_length });
        }

        Ok(Self { file, file_length })
    }

    /// Read a page from disk into `page`.
    ///
    /// Reads up to `PAGE_SIZE` bytes at the page's offset. A short read is
    /// tolerated: the rest of `page` is left untouched (zero for a fresh
    /// buffer). Returns the number of bytes read.
    pub fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<usize> {
        self.file.seek(SeekFrom::Start(page_id.file_offset()))?;

        let buf = page.as_mut_slice();
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(filled)
    }

    /// Write a full page to disk at its offset.
    ///
    /// Writing past the current end extends the file.
    pub fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        let offset = page_id.file_offset();
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(page.as_slice())?;

        self.file_length = self.file_length.max(offset + PAGE_SIZE as u64);
        Ok(())
    }

    /// Flush file contents and metadata to stable storage.
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Number of whole pages currently on disk.
    #[inline]
    pub fn page_count(&self) -> u32 {
        (self.file_length / PAGE_SIZE as u64) as u32
    }

    /// Length of the file in bytes.
    #[inline]
    pub fn file_length(&self) -> u64 {
        self.file_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let dm = DiskManager::open(&path).unwrap();
        assert_eq!(dm.page_count(), 0);
        assert_eq!(dm.file_length(), 0);
        assert!(path.exists());
    }

    #[test]
    fn test_open_rejects_partial_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        std::fs::write(&path, vec![0u8; PAGE_SIZE + 10]).unwrap();

        match DiskManager::open(&path) {
            Err(Error::PartialPage { file_length }) => {
                assert_eq!(file_length, PAGE_SIZE as u64 + 10)
            }
            other => panic!("expected PartialPage, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_write_and_read_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let mut dm = DiskManager::open(&path).unwrap();

        let mut page = Page::new();
        page.as_mut_slice()[0] = 0xAB;
        page.as_mut_slice()[4095] = 0xEF;
        dm.write_page(PageId::new(0), &page).unwrap();
        assert_eq!(dm.page_count(), 1);

        let mut read_back = Page::new();
        assert_eq!(dm.read_page(PageId::new(0), &mut read_back).unwrap(), PAGE_SIZE);
        assert_eq!(read_back.as_slice()[0], 0xAB);
        assert_eq!(read_back.as_slice()[4095], 0xEF);
    }

    #[test]
    fn test_read_past_end_is_short() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let mut dm = DiskManager::open(&path).unwrap();
        let mut page = Page::new();
        assert_eq!(dm.read_page(PageId::new(3), &mut page).unwrap(), 0);
        assert!(page.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_extends_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let mut dm = DiskManager::open(&path).unwrap();
        dm.write_page(PageId::new(2), &Page::new()).unwrap();

        assert_eq!(dm.page_count(), 3);
        assert_eq!(dm.file_length(), 3 * PAGE_SIZE as u64);
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut dm = DiskManager::open(&path).unwrap();
            let mut page = Page::new();
            page.as_mut_slice()[0] = 0x42;
            dm.write_page(PageId::new(0), &page).unwrap();
            dm.sync().unwrap();
        }

        {
            let mut dm = DiskManager::open(&path).unwrap();
            assert_eq!(dm.page_count(), 1);

            let mut page = Page::new();
            dm.read_page(PageId::new(0), &mut page).unwrap();
            assert_eq!(page.as_slice()[0], 0x42);
        }
    }
}
