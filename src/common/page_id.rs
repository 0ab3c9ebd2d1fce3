//! Page identifier type.

use std::fmt;

use crate::common::config::PAGE_SIZE;

/// Identifies a page in the table file.
///
/// Page numbers are zero-based and dense: page `N` is the `N`-th
/// `PAGE_SIZE` block of the file. Child pointers inside internal nodes
/// store the raw `u32`.
///
/// # Example
/// ```
/// use stratadb::PageId;
///
/// let page_id = PageId::new(3);
/// assert_eq!(page_id.file_offset(), 3 * 4096);
/// assert_eq!(PageId::ROOT.0, 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// The root of the tree always lives on page 0.
    pub const ROOT: PageId = PageId(0);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Byte offset of this page within the table file.
    #[inline]
    pub fn file_offset(&self) -> u64 {
        self.0 as u64 * PAGE_SIZE as u64
    }

    /// Index into the pager's page slots.
    #[inline]
    pub(crate) fn slot(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({})", self.0)
    }
}
