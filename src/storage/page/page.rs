//! Page - the fundamental 4KB unit of storage.
//!
//! A [`Page`] is a raw 4KB byte array that serves as the unit of I/O
//! between disk and memory. The pager caches one `Page` per page number;
//! the B-tree reads it through typed node views.

use crate::common::config::PAGE_SIZE;

use super::page_header::PageHeader;
use crate::common::Result;

/// A page of data (4KB, 4KB-aligned).
///
/// # Clone Implementation
/// `Page` does NOT implement `Clone` in production code: copying 4KB
/// should be explicit (see [`Page::copy_from`]). A `#[cfg(test)]` Clone is
/// provided for tests.
///
/// # Example
/// ```
/// use stratadb::storage::page::Page;
///
/// let mut page = Page::new();
/// page.write_u32(10, 0xDEADBEEF);
/// assert_eq!(page.read_u32(10), 0xDEADBEEF);
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Overwrite this page with the full contents of another.
    pub fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data);
    }

    /// Get the size of a page.
    #[inline]
    pub const fn size() -> usize {
        PAGE_SIZE
    }

    /// Read a little-endian `u32` at `offset`.
    ///
    /// # Panics
    /// Panics if `offset + 4` exceeds the page.
    #[inline]
    pub fn read_u32(&self, offset: usize) -> u32 {
        let d = &self.data[offset..offset + 4];
        u32::from_le_bytes([d[0], d[1], d[2], d[3]])
    }

    /// Write a little-endian `u32` at `offset`.
    ///
    /// # Panics
    /// Panics if `offset + 4` exceeds the page.
    #[inline]
    pub fn write_u32(&mut self, offset: usize, value: u32) {
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Read the common node header.
    pub fn header(&self) -> Result<PageHeader> {
        PageHeader::from_bytes(&self.data)
    }

    /// Write the common node header.
    pub fn set_header(&mut self, header: &PageHeader) {
        header.write_to(&mut self.data);
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

// Clone only available in tests - forces explicit copying in production
#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut new_page = Page::new();
        new_page.copy_from(self);
        new_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::page::NodeType;

    #[test]
    fn test_page_size_and_alignment() {
        assert_eq!(std::mem::size_of::<Page>(), PAGE_SIZE);
        assert_eq!(std::mem::align_of::<Page>(), 4096);
    }

    #[test]
    fn test_page_new() {
        let page = Page::new();
        assert_eq!(page.as_slice()[0], 0);
        assert_eq!(page.as_slice()[4095], 0);
    }

    #[test]
    fn test_u32_little_endian() {
        let mut page = Page::new();
        page.write_u32(6, 0x04030201);

        assert_eq!(&page.as_slice()[6..10], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(page.read_u32(6), 0x04030201);
    }

    #[test]
    fn test_u32_at_page_end() {
        let mut page = Page::new();
        page.write_u32(PAGE_SIZE - 4, 7);
        assert_eq!(page.read_u32(PAGE_SIZE - 4), 7);
    }

    #[test]
    #[should_panic]
    fn test_u32_past_page_end_panics() {
        let page = Page::new();
        page.read_u32(PAGE_SIZE - 3);
    }

    #[test]
    fn test_page_reset_and_copy() {
        let mut page = Page::new();
        page.as_mut_slice()[0] = 0xFF;
        page.as_mut_slice()[100] = 0xAB;

        let mut copy = Page::new();
        copy.copy_from(&page);
        assert_eq!(copy.as_slice()[100], 0xAB);

        page.reset();
        assert_eq!(page.as_slice()[0], 0);
        assert_eq!(copy.as_slice()[0], 0xFF);
    }

    #[test]
    fn test_header_accessors() {
        let mut page = Page::new();
        let mut header = page.header().unwrap();
        assert_eq!(header.node_type, NodeType::Leaf);

        header.node_type = NodeType::Internal;
        header.is_root = true;
        page.set_header(&header);

        assert_eq!(page.header().unwrap(), header);
        assert_eq!(page.as_slice()[0], 1);
        assert_eq!(page.as_slice()[1], 1);
    }
}
