//! Configuration for StrataDB.
//!
//! Fixed layout constants live here next to [`TableOptions`], the
//! per-table knobs chosen at open time.

/// Size of a page in bytes (4KB).
///
/// Every page in the database file, and every buffer in the pager cache,
/// is exactly this size. Page `N` lives at byte offset `N × PAGE_SIZE`.
pub const PAGE_SIZE: usize = 4096;

/// Default page capacity of a table.
///
/// The pager refuses page numbers at or above the configured capacity.
pub const TABLE_MAX_PAGES: u32 = 100;

/// What to do when an insert lands in a full leaf.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Split the leaf and promote a new root.
    #[default]
    Split,
    /// Legacy single-page mode: a full leaf rejects the insert with
    /// `Error::CapacityExceeded`.
    Disabled,
}

/// Options controlling how a table is opened and closed.
///
/// # Example
/// ```
/// use stratadb::common::config::{SplitPolicy, TableOptions};
///
/// let options = TableOptions::default()
///     .with_max_pages(16)
///     .with_split_policy(SplitPolicy::Disabled);
/// assert_eq!(options.max_pages, 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Fixed page capacity of the table.
    pub max_pages: u32,
    /// Leaf overflow behavior.
    pub split_policy: SplitPolicy,
    /// Call `fsync` after the close-time flush.
    pub sync_on_close: bool,
}

impl TableOptions {
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_split_policy(mut self, split_policy: SplitPolicy) -> Self {
        self.split_policy = split_policy;
        self
    }

    pub fn with_sync_on_close(mut self, sync_on_close: bool) -> Self {
        self.sync_on_close = sync_on_close;
        self
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            max_pages: TABLE_MAX_PAGES,
            split_policy: SplitPolicy::Split,
            sync_on_close: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        assert!(PAGE_SIZE.is_power_of_two());
        assert_eq!(PAGE_SIZE, 4096);
    }

    #[test]
    fn test_default_options() {
        let options = TableOptions::default();
        assert_eq!(options.max_pages, TABLE_MAX_PAGES);
        assert_eq!(options.split_policy, SplitPolicy::Split);
        assert!(options.sync_on_close);
    }

    #[test]
    fn test_option_setters() {
        let options = TableOptions::default()
            .with_max_pages(3)
            .with_split_policy(SplitPolicy::Disabled)
            .with_sync_on_close(false);

        assert_eq!(options.max_pages, 3);
        assert_eq!(options.split_policy, SplitPolicy::Disabled);
        assert!(!options.sync_on_close);
    }
}
