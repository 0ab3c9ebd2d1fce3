//! B-tree engine: search, leaf insertion, leaf split, root promotion.
//!
//! The tree has no state of its own beyond the page bytes. Page 0 is the
//! root for the table's whole life: when the root leaf splits, its
//! contents move to a fresh page and page 0 is rewritten in place as an
//! internal node.
//!
//! Only single-level promotion is supported. A full leaf that is not the
//! root cannot be split (no parent pointers are maintained), so such an
//! insert fails with `Error::UnsupportedSplit` before anything is written.

use std::ops::Deref;

use tracing::{debug, error};

use crate::common::config::SplitPolicy;
use crate::common::{Error, PageId, Result};
use crate::index::btree::node::{
    self, InternalNode, LeafNode, Node, LEAF_NODE_LEFT_SPLIT_COUNT, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_RIGHT_SPLIT_COUNT,
};
use crate::index::btree::Cursor;
use crate::pager::Pager;
use crate::record::Row;
use crate::storage::page::Page;
use crate::table::{ExecuteResult, Table};

/// Leaf position reached by a descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LeafPosition {
    pub page_id: PageId,
    pub cell_num: u32,
    pub cell_count: u32,
}

/// Position a cursor at `key`, or at the place it would be inserted.
pub fn find(table: &mut Table, key: u32) -> Result<Cursor<'_>> {
    let root = table.root_page_id();
    let pos = locate(table.pager_mut(), root, key)?;
    Ok(Cursor::at(table, pos))
}

/// Descend from `page_id` to the leaf cell for `key`.
///
/// Internal nodes route to the leftmost child whose separator is at least
/// `key` (the right child when none is). In the leaf, an exact match
/// yields its index and a miss yields the insertion point.
pub(crate) fn locate(pager: &mut Pager, mut page_id: PageId, key: u32) -> Result<LeafPosition> {
    let mut depth = 0;
    loop {
        let page = pager.get_page(page_id)?;
        let guard = page.read();
        match Node::new(&*guard)? {
            Node::Leaf(leaf) => {
                return Ok(LeafPosition {
                    page_id,
                    cell_num: leaf_search(&leaf, key)?,
                    cell_count: leaf.cell_count(),
                });
            }
            Node::Internal(internal) => {
                let child_num = internal_search(&internal, key)?;
                depth += 1;
                page_id = checked_child(pager, internal.child(child_num)?, depth)?;
            }
        }
    }
}

/// Validate a child pointer read from an internal node, `depth` levels
/// below the root.
///
/// A valid child is an allocated page other than the root, and every page
/// on a root-to-leaf path is distinct, so no path is longer than the page
/// count.
///
/// # Errors
/// - `Error::ChildPageOutOfRange` if `child` is at or past `num_pages`
/// - `Error::TreeCycle` if `child` is the root or `depth` reaches `num_pages`
pub(crate) fn checked_child(pager: &Pager, child: PageId, depth: u32) -> Result<PageId> {
    let num_pages = pager.num_pages();
    if child.0 >= num_pages {
        return Err(Error::ChildPageOutOfRange {
            page_id: child,
            num_pages,
        });
    }
    if child == PageId::ROOT || depth >= num_pages {
        return Err(Error::TreeCycle {
            page_id: child,
            depth,
        });
    }
    Ok(child)
}

fn leaf_search<P: Deref<Target = Page>>(leaf: &LeafNode<P>, key: u32) -> Result<u32> {
    let mut left = 0;
    let mut right = leaf.cell_count();
    while left < right {
        let mid = left + (right - left) / 2;
        let key_at_mid = leaf.key(mid)?;
        if key == key_at_mid {
            return Ok(mid);
        }
        if key < key_at_mid {
            right = mid;
        } else {
            left = mid + 1;
        }
    }
    Ok(left)
}

fn internal_search<P: Deref<Target = Page>>(node: &InternalNode<P>, key: u32) -> Result<u32> {
    // there is one more child than key
    let mut left = 0;
    let mut right = node.num_keys();
    while left < right {
        let mid = left + (right - left) / 2;
        if node.key(mid)? >= key {
            right = mid;
        } else {
            left = mid + 1;
        }
    }
    Ok(left)
}

/// Insert `row` under `key`.
///
/// Returns `ExecuteResult::DuplicateKey` without touching the tree when
/// `key` is already present.
///
/// # Errors
/// - `Error::UnsupportedSplit` if the target leaf is full and not the root
/// - `Error::CapacityExceeded` if the leaf is full and splitting is disabled
/// - `Error::PageOutOfRange` if a split would exceed the page capacity
pub fn insert(table: &mut Table, key: u32, row: &Row) -> Result<ExecuteResult> {
    let mut cursor = find(table, key)?;
    if cursor.current_key()? == Some(key) {
        return Ok(ExecuteResult::DuplicateKey);
    }

    let Cursor {
        table,
        page_id,
        cell_num,
        ..
    } = cursor;
    leaf_insert(table, page_id, cell_num, key, row)?;
    Ok(ExecuteResult::Success)
}

/// Insert a cell at `cell_num` of leaf `page_id`, splitting when full.
pub(crate) fn leaf_insert(
    table: &mut Table,
    page_id: PageId,
    cell_num: u32,
    key: u32,
    row: &Row,
) -> Result<()> {
    let page = table.pager_mut().get_page(page_id)?;
    let mut guard = page.write();
    let mut leaf = LeafNode::new(&mut *guard)?;
    let num_cells = leaf.cell_count();

    if num_cells >= LEAF_NODE_MAX_CELLS {
        drop(guard);
        return split_and_insert(table, page_id, cell_num, key, row);
    }

    // make room for the new cell, highest index first
    for i in (cell_num + 1..=num_cells).rev() {
        leaf.move_cell(i - 1, i)?;
    }
    leaf.write_cell(cell_num, key, row)?;
    leaf.set_cell_count(num_cells + 1)
}

/// Split full leaf `old_id` while inserting the new cell at `cell_num`.
///
/// The `LEAF_NODE_MAX_CELLS + 1` cells are distributed from the highest
/// index down: the upper `LEAF_NODE_RIGHT_SPLIT_COUNT` go to a new right
/// page, the rest stay in place. The new cell is written straight into its
/// destination slot.
fn split_and_insert(
    table: &mut Table,
    old_id: PageId,
    cell_num: u32,
    key: u32,
    row: &Row,
) -> Result<()> {
    if table.options().split_policy == SplitPolicy::Disabled {
        return Err(Error::CapacityExceeded {
            max_cells: LEAF_NODE_MAX_CELLS,
        });
    }

    let pager = table.pager_mut();
    let old_page = pager.get_page(old_id)?;
    let old_is_root = node::is_root(&old_page.read());
    if !old_is_root {
        error!(page_id = %old_id, key, "need to implement updating parent after split");
        return Err(Error::UnsupportedSplit(old_id));
    }

    // right page now, plus the relocated left child for the new root
    let new_id = pager.allocate_unused_page_id();
    let last_needed = new_id.0 + 1;
    if last_needed >= pager.max_pages() {
        return Err(Error::PageOutOfRange {
            page_id: PageId::new(last_needed),
            max_pages: pager.max_pages(),
        });
    }

    debug!(%old_id, %new_id, cell_num, key, "splitting leaf");
    let new_page = pager.get_page(new_id)?;
    {
        let mut old_guard = old_page.write();
        let mut new_guard = new_page.write();
        let mut old_leaf = LeafNode::new(&mut *old_guard)?;
        let mut new_leaf = LeafNode::initialize(&mut *new_guard);

        for i in (0..=LEAF_NODE_MAX_CELLS).rev() {
            let to_right = i >= LEAF_NODE_LEFT_SPLIT_COUNT;
            let index_within_node = if to_right {
                i - LEAF_NODE_LEFT_SPLIT_COUNT
            } else {
                i
            };

            if i == cell_num {
                if to_right {
                    new_leaf.write_cell(index_within_node, key, row)?;
                } else {
                    old_leaf.write_cell(index_within_node, key, row)?;
                }
                continue;
            }

            let source = if i > cell_num { i - 1 } else { i };
            if to_right {
                new_leaf.put_cell(index_within_node, old_leaf.cell(source)?)?;
            } else {
                old_leaf.move_cell(source, index_within_node)?;
            }
        }

        old_leaf.set_cell_count(LEAF_NODE_LEFT_SPLIT_COUNT)?;
        new_leaf.set_cell_count(LEAF_NODE_RIGHT_SPLIT_COUNT)?;
    }

    create_new_root(table, new_id)
}

/// Promote a new root after the root leaf split.
///
/// The old root's bytes move to a fresh page that becomes the left child.
/// Page 0 is reinitialized as an internal node with one separator (the
/// left child's max key), the left child, and `right_child_id`.
fn create_new_root(table: &mut Table, right_child_id: PageId) -> Result<()> {
    let root_id = table.root_page_id();
    let pager = table.pager_mut();
    let root_page = pager.get_page(root_id)?;
    let left_child_id = pager.allocate_unused_page_id();
    let left_page = pager.get_page(left_child_id)?;

    let mut root = root_page.write();
    let mut left = left_page.write();

    left.copy_from(&root);
    node::set_root(&mut left, false);
    let left_child_max_key = Node::new(&*left)?.max_key()?;

    let mut new_root = InternalNode::initialize(&mut *root);
    new_root.set_root(true);
    new_root.set_num_keys(1)?;
    new_root.set_child(0, left_child_id)?;
    new_root.set_key(0, left_child_max_key)?;
    new_root.set_right_child(right_child_id);

    debug!(
        left = %left_child_id,
        right = %right_child_id,
        separator = left_child_max_key,
        "promoted new root"
    );
    Ok(())
}
