//! Diagnostic renderings of the tree and its layout constants.

use crate::common::{PageId, Result};
use crate::index::btree::node::{
    Node, COMMON_NODE_HEADER_SIZE, LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE,
    LEAF_NODE_MAX_CELLS, LEAF_NODE_SPACE_FOR_CELLS,
};
use crate::index::btree::tree;
use crate::pager::Pager;
use crate::record::ROW_SIZE;

/// Name/value pairs of the on-disk layout, in display order.
pub fn layout_constants() -> Vec<(&'static str, usize)> {
    vec![
        ("ROW_SIZE", ROW_SIZE),
        ("COMMON_NODE_HEADER_SIZE", COMMON_NODE_HEADER_SIZE),
        ("LEAF_NODE_HEADER_SIZE", LEAF_NODE_HEADER_SIZE),
        ("LEAF_NODE_CELL_SIZE", LEAF_NODE_CELL_SIZE),
        ("LEAF_NODE_SPACE_FOR_CELLS", LEAF_NODE_SPACE_FOR_CELLS),
        ("LEAF_NODE_MAX_CELLS", LEAF_NODE_MAX_CELLS as usize),
    ]
}

enum Shape {
    Leaf(Vec<u32>),
    Internal {
        children: Vec<PageId>,
        keys: Vec<u32>,
    },
}

/// Render the subtree rooted at `page_id`, two spaces of indent per level.
///
/// ```text
/// - internal (size 1)
///   - leaf (size 2)
///     - 1
///     - 2
///   - key 2
///   - leaf (size 1)
///     - 3
/// ```
pub fn render_tree(pager: &mut Pager, page_id: PageId) -> Result<String> {
    let mut out = String::new();
    render_node(pager, page_id, 0, &mut out)?;
    Ok(out)
}

fn render_node(pager: &mut Pager, page_id: PageId, level: usize, out: &mut String) -> Result<()> {
    let page = pager.get_page(page_id)?;
    let shape = {
        let guard = page.read();
        match Node::new(&*guard)? {
            Node::Leaf(leaf) => Shape::Leaf(leaf.keys()?),
            Node::Internal(internal) => Shape::Internal {
                children: (0..=internal.num_keys())
                    .map(|i| internal.child(i))
                    .collect::<Result<_>>()?,
                keys: (0..internal.num_keys())
                    .map(|i| internal.key(i))
                    .collect::<Result<_>>()?,
            },
        }
    };

    match shape {
        Shape::Leaf(keys) => {
            push_line(out, level, &format!("- leaf (size {})", keys.len()));
            for key in keys {
                push_line(out, level + 1, &format!("- {}", key));
            }
        }
        Shape::Internal { children, keys } => {
            push_line(out, level, &format!("- internal (size {})", keys.len()));
            let depth = level as u32 + 1;
            for (child, key) in children.iter().zip(&keys) {
                let child = tree::checked_child(pager, *child, depth)?;
                render_node(pager, child, level + 1, out)?;
                push_line(out, level + 1, &format!("- key {}", key));
            }
            if let Some(&right_child) = children.last() {
                let right_child = tree::checked_child(pager, right_child, depth)?;
                render_node(pager, right_child, level + 1, out)?;
            }
        }
    }
    Ok(())
}

fn push_line(out: &mut String, level: usize, line: &str) {
    for _ in 0..level {
        out.push_str("  ");
    }
    out.push_str(line);
    out.push('\n');
}
