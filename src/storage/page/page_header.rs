//! Common node header and node type definitions.
//!
//! Every page starts with a [`PageHeader`]:
//! - [`NodeType`] discriminator (leaf or internal)
//! - root flag
//! - parent pointer (reserved, always zero)

use crate::common::{Error, Result};

/// Kind of B-tree node stored in a page.
///
/// Uses `#[repr(u8)]` to guarantee a 1-byte on-disk tag.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Leaf node holding (key, row) cells. A zeroed page reads as an
    /// empty leaf.
    #[default]
    Leaf = 0,
    /// Internal node holding (child, key) cells plus a right child.
    Internal = 1,
}

impl TryFrom<u8> for NodeType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(NodeType::Leaf),
            1 => Ok(NodeType::Internal),
            other => Err(Error::InvalidNodeType(other)),
        }
    }
}

/// Metadata stored at the beginning of every page.
///
/// # Layout (6 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       1     node_type (NodeType as u8)
/// 1       1     is_root (0 or 1)
/// 2       4     parent pointer (little-endian, unused)
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Type of this node.
    pub node_type: NodeType,
    /// Whether this node is the root of the tree.
    pub is_root: bool,
    /// Parent page number. Never maintained; written as zero.
    pub parent: u32,
}

impl PageHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 6;

    pub const OFFSET_NODE_TYPE: usize = 0;
    pub const OFFSET_IS_ROOT: usize = 1;
    pub const OFFSET_PARENT: usize = 2;

    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            is_root: false,
            parent: 0,
        }
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Errors
    /// Returns `Error::InvalidNodeType` if the tag byte does not decode.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        let node_type = NodeType::try_from(data[Self::OFFSET_NODE_TYPE])?;
        let is_root = data[Self::OFFSET_IS_ROOT] != 0;
        let parent = u32::from_le_bytes([
            data[Self::OFFSET_PARENT],
            data[Self::OFFSET_PARENT + 1],
            data[Self::OFFSET_PARENT + 2],
            data[Self::OFFSET_PARENT + 3],
        ]);

        Ok(Self {
            node_type,
            is_root,
            parent,
        })
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        data[Self::OFFSET_NODE_TYPE] = self.node_type as u8;
        data[Self::OFFSET_IS_ROOT] = self.is_root as u8;
        data[Self::OFFSET_PARENT..Self::OFFSET_PARENT + 4]
            .copy_from_slice(&self.parent.to_le_bytes());
    }
}
