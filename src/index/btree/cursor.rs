//! Cursor - a position within the table's leaf level.

use tracing::trace;

use crate::common::{PageId, Result};
use crate::index::btree::node::{LeafNode, Node};
use crate::index::btree::tree::{self, LeafPosition};
use crate::record::{self, Row};
use crate::table::Table;

/// A position in the leaf level: `(page_id, cell_num)` plus an
/// end-of-table flag.
///
/// A cursor borrows its table mutably, so at most one exists at a time and
/// the tree cannot change under it. Values are read through the pager on
/// every access; nothing is cached in the cursor.
///
/// # Example
/// ```no_run
/// use stratadb::Table;
///
/// let mut table = Table::open("users.db")?;
/// let mut cursor = table.start()?;
/// while !cursor.is_end() {
///     println!("{}", cursor.row()?);
///     cursor.advance()?;
/// }
/// # Ok::<(), stratadb::Error>(())
/// ```
pub struct Cursor<'a> {
    pub(crate) table: &'a mut Table,
    pub(crate) page_id: PageId,
    pub(crate) cell_num: u32,
    pub(crate) end_of_table: bool,
}

impl<'a> Cursor<'a> {
    /// Position at the first cell of the leftmost leaf.
    ///
    /// `is_end()` is true immediately when that leaf is empty.
    pub fn start(table: &'a mut Table) -> Result<Self> {
        let mut page_id = table.root_page_id();
        let mut depth = 0;
        loop {
            let page = table.pager_mut().get_page(page_id)?;
            let guard = page.read();
            match Node::new(&*guard)? {
                Node::Leaf(leaf) => {
                    let end_of_table = leaf.cell_count() == 0;
                    return Ok(Self {
                        table,
                        page_id,
                        cell_num: 0,
                        end_of_table,
                    });
                }
                Node::Internal(internal) => {
                    depth += 1;
                    page_id = tree::checked_child(table.pager(), internal.child(0)?, depth)?;
                }
            }
        }
    }

    pub(crate) fn at(table: &'a mut Table, pos: LeafPosition) -> Self {
        Self {
            table,
            page_id: pos.page_id,
            cell_num: pos.cell_num,
            end_of_table: pos.cell_num >= pos.cell_count,
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn cell_num(&self) -> u32 {
        self.cell_num
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.end_of_table
    }

    /// Step to the next cell in key order.
    ///
    /// When the current leaf is exhausted the cursor moves to the next leaf
    /// by descending again from the root with the exhausted leaf's max key
    /// plus one. In a single-leaf tree, or past the largest key, it sets the
    /// end-of-table flag instead.
    ///
    /// # Panics
    /// Panics if the cursor is already at the end of the table.
    pub fn advance(&mut self) -> Result<()> {
        assert!(!self.end_of_table, "advance past end of table");

        let page = self.table.pager_mut().get_page(self.page_id)?;
        let (cell_count, max_key) = {
            let guard = page.read();
            let leaf = LeafNode::new(&*guard)?;
            (leaf.cell_count(), leaf.max_key()?)
        };

        self.cell_num += 1;
        if self.cell_num >= cell_count {
            self.seek_next_leaf(max_key)?;
        }
        Ok(())
    }

    fn seek_next_leaf(&mut self, exhausted_max_key: u32) -> Result<()> {
        let root = self.table.root_page_id();
        let next_key = match exhausted_max_key.checked_add(1) {
            Some(key) if self.page_id != root => key,
            _ => {
                self.end_of_table = true;
                return Ok(());
            }
        };

        let pos = tree::locate(self.table.pager_mut(), root, next_key)?;
        if pos.page_id == self.page_id || pos.cell_num >= pos.cell_count {
            self.end_of_table = true;
        } else {
            trace!(from = %self.page_id, to = %pos.page_id, "cursor crossed leaf");
            self.page_id = pos.page_id;
            self.cell_num = pos.cell_num;
        }
        Ok(())
    }

    /// Run `f` over the current value slot while its page is locked.
    ///
    /// # Errors
    /// Returns `Error::CellOutOfRange` if the cursor is past the last cell.
    pub fn with_value<R>(&mut self, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
        let page = self.table.pager_mut().get_page(self.page_id)?;
        let guard = page.read();
        let leaf = LeafNode::new(&*guard)?;
        Ok(f(leaf.value(self.cell_num)?))
    }

    /// Decode the row at the current position.
    pub fn row(&mut self) -> Result<Row> {
        self.with_value(record::deserialize)
    }

    /// Key at the current position.
    pub fn key(&mut self) -> Result<u32> {
        let page = self.table.pager_mut().get_page(self.page_id)?;
        let guard = page.read();
        LeafNode::new(&*guard)?.key(self.cell_num)
    }

    /// Key at the current position, or `None` if the cursor sits one past
    /// the leaf's last cell.
    pub(crate) fn current_key(&mut self) -> Result<Option<u32>> {
        let page = self.table.pager_mut().get_page(self.page_id)?;
        let guard = page.read();
        let leaf = LeafNode::new(&*guard)?;
        if self.cell_num < leaf.cell_count() {
            leaf.key(self.cell_num).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use crate::index::btree::node::LEAF_NODE_MAX_CELLS;
    use tempfile::tempdir;

    fn row(id: u32) -> Row {
        Row::new(id, &format!("user{}", id), &format!("person{}@example.com", id)).unwrap()
    }

    fn collect_keys(table: &mut Table) -> Vec<u32> {
        let mut cursor = table.start().unwrap();
        let mut keys = Vec::new();
        while !cursor.is_end() {
            keys.push(cursor.key().unwrap());
            cursor.advance().unwrap();
        }
        keys
    }

    #[test]
    fn test_start_on_empty_table() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();

        let cursor = table.start().unwrap();
        assert!(cursor.is_end());
        assert_eq!(cursor.page_id(), PageId::ROOT);
    }

    #[test]
    fn test_walk_single_leaf() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();
        for id in [30, 10, 20] {
            table.insert(&row(id)).unwrap();
        }

        assert_eq!(collect_keys(&mut table), vec![10, 20, 30]);
    }

    #[test]
    fn test_walk_crosses_leaves() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();
        for id in (1..=LEAF_NODE_MAX_CELLS + 3).rev() {
            table.insert(&row(id)).unwrap();
        }

        let expected: Vec<u32> = (1..=LEAF_NODE_MAX_CELLS + 3).collect();
        assert_eq!(collect_keys(&mut table), expected);
    }

    #[test]
    fn test_start_descends_to_leftmost_leaf() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();
        for id in 1..=LEAF_NODE_MAX_CELLS + 1 {
            table.insert(&row(id)).unwrap();
        }

        let mut cursor = table.start().unwrap();
        assert_eq!(cursor.page_id(), PageId::new(2));
        assert_eq!(cursor.row().unwrap(), row(1));
    }

    #[test]
    fn test_value_past_end_is_error() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();
        table.insert(&row(1)).unwrap();

        let mut cursor = table.find(5).unwrap();
        assert!(cursor.is_end());
        assert!(matches!(
            cursor.row(),
            Err(Error::CellOutOfRange { index: 1, bound: 1 })
        ));
    }

    #[test]
    fn test_with_value_reads_raw_slot() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();
        table.insert(&row(42)).unwrap();

        let mut cursor = table.find(42).unwrap();
        let id_bytes = cursor.with_value(|slot| slot[..4].to_vec()).unwrap();
        assert_eq!(id_bytes, 42u32.to_le_bytes());
    }

    #[test]
    #[should_panic(expected = "advance past end of table")]
    fn test_advance_at_end_panics() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();

        let mut cursor = table.start().unwrap();
        cursor.advance().unwrap();
    }
}
