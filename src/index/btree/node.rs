//! Node codec - typed views over a page's bytes.
//!
//! A page is interpreted as either a [`LeafNode`] or an [`InternalNode`],
//! chosen by the node-type tag in its [`PageHeader`]. Views are generic
//! over anything that derefs to a [`Page`] (`&Page`, `&mut Page`, or a
//! lock guard), and every cell access is bounds-checked.
//!
//! # Leaf layout
//! ```text
//! ┌──────────────────────┬──────────────┬───────────────┬─────┐
//! │ common header (6)    │ num_cells(4) │ key(4) row    │ ... │
//! └──────────────────────┴──────────────┴───────────────┴─────┘
//! 0                      6              10         10 + 297 × i
//! ```
//!
//! # Internal layout
//! ```text
//! ┌──────────────────────┬─────────────┬────────────────┬──────────────────┬─────┐
//! │ common header (6)    │ num_keys(4) │ right_child(4) │ child(4) key(4)  │ ... │
//! └──────────────────────┴─────────────┴────────────────┴──────────────────┴─────┘
//! 0                      6             10               14           14 + 8 × i
//! ```

use std::ops::{Deref, DerefMut};

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::record::{self, Row, ROW_SIZE};
use crate::storage::page::{NodeType, Page, PageHeader};

// Common node header
pub const COMMON_NODE_HEADER_SIZE: usize = PageHeader::SIZE;

// Leaf node header
pub const LEAF_NODE_NUM_CELLS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const LEAF_NODE_NUM_CELLS_SIZE: usize = 4;
pub const LEAF_NODE_HEADER_SIZE: usize = COMMON_NODE_HEADER_SIZE + LEAF_NODE_NUM_CELLS_SIZE;

// Leaf node body
pub const LEAF_NODE_KEY_SIZE: usize = 4;
pub const LEAF_NODE_VALUE_SIZE: usize = ROW_SIZE;
pub const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + LEAF_NODE_VALUE_SIZE;
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;
pub const LEAF_NODE_MAX_CELLS: u32 = (LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE) as u32;

/// Cells moved to the new right page when a full leaf splits.
pub const LEAF_NODE_RIGHT_SPLIT_COUNT: u32 = (LEAF_NODE_MAX_CELLS + 2) / 2;
/// Cells kept in the original left page when a full leaf splits.
pub const LEAF_NODE_LEFT_SPLIT_COUNT: u32 = LEAF_NODE_MAX_CELLS + 1 - LEAF_NODE_RIGHT_SPLIT_COUNT;

// Internal node header
pub const INTERNAL_NODE_NUM_KEYS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const INTERNAL_NODE_NUM_KEYS_SIZE: usize = 4;
pub const INTERNAL_NODE_RIGHT_CHILD_OFFSET: usize =
    INTERNAL_NODE_NUM_KEYS_OFFSET + INTERNAL_NODE_NUM_KEYS_SIZE;
pub const INTERNAL_NODE_RIGHT_CHILD_SIZE: usize = 4;
pub const INTERNAL_NODE_HEADER_SIZE: usize =
    COMMON_NODE_HEADER_SIZE + INTERNAL_NODE_NUM_KEYS_SIZE + INTERNAL_NODE_RIGHT_CHILD_SIZE;

// Internal node body
pub const INTERNAL_NODE_CHILD_SIZE: usize = 4;
pub const INTERNAL_NODE_KEY_SIZE: usize = 4;
pub const INTERNAL_NODE_CELL_SIZE: usize = INTERNAL_NODE_CHILD_SIZE + INTERNAL_NODE_KEY_SIZE;
pub const INTERNAL_NODE_MAX_CELLS: u32 =
    ((PAGE_SIZE - INTERNAL_NODE_HEADER_SIZE) / INTERNAL_NODE_CELL_SIZE) as u32;

/// Decode the node-type tag of a page.
pub fn node_type(page: &Page) -> Result<NodeType> {
    Ok(page.header()?.node_type)
}

/// Overwrite the node-type tag of a page.
pub fn set_node_type(page: &mut Page, node_type: NodeType) {
    page.as_mut_slice()[PageHeader::OFFSET_NODE_TYPE] = node_type as u8;
}

/// Read the root flag of a page.
pub fn is_root(page: &Page) -> bool {
    page.as_slice()[PageHeader::OFFSET_IS_ROOT] != 0
}

/// Overwrite the root flag of a page.
pub fn set_root(page: &mut Page, is_root: bool) {
    page.as_mut_slice()[PageHeader::OFFSET_IS_ROOT] = is_root as u8;
}

fn expect_type(page: &Page, expected: NodeType) -> Result<()> {
    let found = node_type(page)?;
    if found != expected {
        return Err(Error::UnexpectedNodeType { expected, found });
    }
    Ok(())
}

fn leaf_cell_offset(index: u32) -> Result<usize> {
    if index >= LEAF_NODE_MAX_CELLS {
        return Err(Error::CellOutOfRange {
            index,
            bound: LEAF_NODE_MAX_CELLS,
        });
    }
    Ok(LEAF_NODE_HEADER_SIZE + LEAF_NODE_CELL_SIZE * index as usize)
}

fn internal_cell_offset(index: u32) -> Result<usize> {
    if index >= INTERNAL_NODE_MAX_CELLS {
        return Err(Error::CellOutOfRange {
            index,
            bound: INTERNAL_NODE_MAX_CELLS,
        });
    }
    Ok(INTERNAL_NODE_HEADER_SIZE + INTERNAL_NODE_CELL_SIZE * index as usize)
}

/// A page interpreted as either node variant.
pub enum Node<P> {
    Leaf(LeafNode<P>),
    Internal(InternalNode<P>),
}

impl<P: Deref<Target = Page>> Node<P> {
    /// Build the view matching the page's type tag.
    pub fn new(page: P) -> Result<Self> {
        match node_type(&page)? {
            NodeType::Leaf => Ok(Node::Leaf(LeafNode { page })),
            NodeType::Internal => Ok(Node::Internal(InternalNode { page })),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Leaf(_) => NodeType::Leaf,
            Node::Internal(_) => NodeType::Internal,
        }
    }

    pub fn is_root(&self) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.is_root(),
            Node::Internal(internal) => internal.is_root(),
        }
    }

    /// Largest key this node records.
    ///
    /// For a leaf, the last cell's key. For an internal node, the last
    /// stored separator, which bounds every child except the right one.
    pub fn max_key(&self) -> Result<u32> {
        match self {
            Node::Leaf(leaf) => leaf.max_key(),
            Node::Internal(internal) => internal.max_key(),
        }
    }
}

/// Leaf view: a packed array of (key, row) cells in ascending key order.
pub struct LeafNode<P> {
    page: P,
}

impl<P: Deref<Target = Page>> LeafNode<P> {
    /// View `page` as a leaf.
    ///
    /// # Errors
    /// `Error::UnexpectedNodeType` if the page is tagged internal.
    pub fn new(page: P) -> Result<Self> {
        expect_type(&page, NodeType::Leaf)?;
        Ok(Self { page })
    }

    pub fn is_root(&self) -> bool {
        is_root(&self.page)
    }

    #[inline]
    pub fn cell_count(&self) -> u32 {
        self.page.read_u32(LEAF_NODE_NUM_CELLS_OFFSET)
    }

    pub fn is_full(&self) -> bool {
        self.cell_count() >= LEAF_NODE_MAX_CELLS
    }

    fn occupied_offset(&self, index: u32) -> Result<usize> {
        let count = self.cell_count();
        if index >= count {
            return Err(Error::CellOutOfRange { index, bound: count });
        }
        leaf_cell_offset(index)
    }

    /// Raw bytes of cell `index` (key followed by row).
    pub fn cell(&self, index: u32) -> Result<&[u8]> {
        let offset = self.occupied_offset(index)?;
        Ok(&self.page.as_slice()[offset..offset + LEAF_NODE_CELL_SIZE])
    }

    pub fn key(&self, index: u32) -> Result<u32> {
        let offset = self.occupied_offset(index)?;
        Ok(self.page.read_u32(offset))
    }

    /// Row slot of cell `index`.
    pub fn value(&self, index: u32) -> Result<&[u8]> {
        let offset = self.occupied_offset(index)? + LEAF_NODE_KEY_SIZE;
        Ok(&self.page.as_slice()[offset..offset + LEAF_NODE_VALUE_SIZE])
    }

    pub fn max_key(&self) -> Result<u32> {
        match self.cell_count() {
            0 => Err(Error::CellOutOfRange { index: 0, bound: 0 }),
            count => self.key(count - 1),
        }
    }

    /// Keys of every cell, in order.
    pub fn keys(&self) -> Result<Vec<u32>> {
        (0..self.cell_count()).map(|i| self.key(i)).collect()
    }
}

impl<P: DerefMut<Target = Page>> LeafNode<P> {
    /// Format `page` as an empty, non-root leaf.
    pub fn initialize(mut page: P) -> Self {
        page.set_header(&PageHeader::new(NodeType::Leaf));
        page.write_u32(LEAF_NODE_NUM_CELLS_OFFSET, 0);
        Self { page }
    }

    pub fn set_root(&mut self, root: bool) {
        set_root(&mut self.page, root);
    }

    pub fn set_cell_count(&mut self, count: u32) -> Result<()> {
        if count > LEAF_NODE_MAX_CELLS {
            return Err(Error::CellOutOfRange {
                index: count,
                bound: LEAF_NODE_MAX_CELLS,
            });
        }
        self.page.write_u32(LEAF_NODE_NUM_CELLS_OFFSET, count);
        Ok(())
    }

    /// Write a full cell at `index`. The cell count is not touched.
    pub fn write_cell(&mut self, index: u32, key: u32, row: &Row) -> Result<()> {
        let offset = leaf_cell_offset(index)?;
        self.page.write_u32(offset, key);
        let value = offset + LEAF_NODE_KEY_SIZE;
        record::serialize(
            row,
            &mut self.page.as_mut_slice()[value..value + LEAF_NODE_VALUE_SIZE],
        );
        Ok(())
    }

    /// Copy raw cell bytes into slot `index`.
    pub fn put_cell(&mut self, index: u32, cell: &[u8]) -> Result<()> {
        let offset = leaf_cell_offset(index)?;
        self.page.as_mut_slice()[offset..offset + LEAF_NODE_CELL_SIZE]
            .copy_from_slice(&cell[..LEAF_NODE_CELL_SIZE]);
        Ok(())
    }

    /// Copy cell `from` over cell `to` within this page.
    pub fn move_cell(&mut self, from: u32, to: u32) -> Result<()> {
        let src = leaf_cell_offset(from)?;
        let dst = leaf_cell_offset(to)?;
        self.page
            .as_mut_slice()
            .copy_within(src..src + LEAF_NODE_CELL_SIZE, dst);
        Ok(())
    }
}

/// Internal view: (child, key) cells plus a right child in the header.
///
/// Key `i` is the largest key reachable through child `i`; keys greater
/// than every separator live under the right child.
pub struct InternalNode<P> {
    page: P,
}

impl<P: Deref<Target = Page>> InternalNode<P> {
    /// View `page` as an internal node.
    ///
    /// # Errors
    /// `Error::UnexpectedNodeType` if the page is tagged leaf.
    pub fn new(page: P) -> Result<Self> {
        expect_type(&page, NodeType::Internal)?;
        Ok(Self { page })
    }

    pub fn is_root(&self) -> bool {
        is_root(&self.page)
    }

    #[inline]
    pub fn num_keys(&self) -> u32 {
        self.page.read_u32(INTERNAL_NODE_NUM_KEYS_OFFSET)
    }

    pub fn right_child(&self) -> PageId {
        PageId::new(self.page.read_u32(INTERNAL_NODE_RIGHT_CHILD_OFFSET))
    }

    /// Child pointer `index`; `index == num_keys` names the right child.
    ///
    /// # Errors
    /// `Error::ChildOutOfRange` if `index > num_keys`.
    pub fn child(&self, index: u32) -> Result<PageId> {
        let num_keys = self.num_keys();
        if index > num_keys {
            return Err(Error::ChildOutOfRange { index, num_keys });
        }
        if index == num_keys {
            return Ok(self.right_child());
        }
        let offset = internal_cell_offset(index)?;
        Ok(PageId::new(self.page.read_u32(offset)))
    }

    /// Separator key `index`.
    pub fn key(&self, index: u32) -> Result<u32> {
        let num_keys = self.num_keys();
        if index >= num_keys {
            return Err(Error::CellOutOfRange {
                index,
                bound: num_keys,
            });
        }
        let offset = internal_cell_offset(index)?;
        Ok(self.page.read_u32(offset + INTERNAL_NODE_CHILD_SIZE))
    }

    pub fn max_key(&self) -> Result<u32> {
        match self.num_keys() {
            0 => Err(Error::CellOutOfRange { index: 0, bound: 0 }),
            n => self.key(n - 1),
        }
    }
}

impl<P: DerefMut<Target = Page>> InternalNode<P> {
    /// Format `page` as an empty, non-root internal node.
    ///
    /// The whole page is cleared first so no stale leaf cells remain.
    pub fn initialize(mut page: P) -> Self {
        page.reset();
        page.set_header(&PageHeader::new(NodeType::Internal));
        page.write_u32(INTERNAL_NODE_NUM_KEYS_OFFSET, 0);
        Self { page }
    }

    pub fn set_root(&mut self, root: bool) {
        set_root(&mut self.page, root);
    }

    pub fn set_num_keys(&mut self, num_keys: u32) -> Result<()> {
        if num_keys > INTERNAL_NODE_MAX_CELLS {
            return Err(Error::CellOutOfRange {
                index: num_keys,
                bound: INTERNAL_NODE_MAX_CELLS,
            });
        }
        self.page.write_u32(INTERNAL_NODE_NUM_KEYS_OFFSET, num_keys);
        Ok(())
    }

    pub fn set_right_child(&mut self, page_id: PageId) {
        self.page.write_u32(INTERNAL_NODE_RIGHT_CHILD_OFFSET, page_id.0);
    }

    /// Set child pointer `index`; `index == num_keys` sets the right child.
    pub fn set_child(&mut self, index: u32, page_id: PageId) -> Result<()> {
        let num_keys = self.num_keys();
        if index > num_keys {
            return Err(Error::ChildOutOfRange { index, num_keys });
        }
        if index == num_keys {
            self.set_right_child(page_id);
            return Ok(());
        }
        let offset = internal_cell_offset(index)?;
        self.page.write_u32(offset, page_id.0);
        Ok(())
    }

    pub fn set_key(&mut self, index: u32, key: u32) -> Result<()> {
        let offset = internal_cell_offset(index)?;
        self.page.write_u32(offset + INTERNAL_NODE_CHILD_SIZE, key);
        Ok(())
    }
}
