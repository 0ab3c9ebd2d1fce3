//! Error types for StrataDB.

use thiserror::Error;

use crate::common::PageId;
use crate::storage::page::NodeType;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in StrataDB.
///
/// A duplicate key is deliberately absent: it is an ordinary insert
/// outcome (`ExecuteResult::DuplicateKey`), not a failure.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from open, read, write, seek, or sync.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page number is at or beyond the table's page capacity.
    #[error("{page_id} out of range (table holds at most {max_pages} pages)")]
    PageOutOfRange { page_id: PageId, max_pages: u32 },

    /// Cell or key index beyond a node's bound.
    #[error("cell index {index} out of range (bound {bound})")]
    CellOutOfRange { index: u32, bound: u32 },

    /// Child index greater than an internal node's key count.
    #[error("tried to access child {index} > num_keys {num_keys}")]
    ChildOutOfRange { index: u32, num_keys: u32 },

    /// An internal node points at a page the table has never allocated.
    #[error("child pointer to {page_id} past the last page (table has {num_pages} pages)")]
    ChildPageOutOfRange { page_id: PageId, num_pages: u32 },

    /// Descent revisited the root or went deeper than the table has pages.
    #[error("child pointer to {page_id} at depth {depth} forms a cycle")]
    TreeCycle { page_id: PageId, depth: u32 },

    /// The node-type byte of a page does not decode.
    #[error("invalid node type tag {0}")]
    InvalidNodeType(u8),

    /// A leaf view was requested over an internal page or vice versa.
    #[error("expected {expected:?} node, found {found:?}")]
    UnexpectedNodeType { expected: NodeType, found: NodeType },

    /// Tried to flush a page that was never loaded into the cache.
    #[error("tried to flush uncached {0}")]
    PageNotCached(PageId),

    /// The database file does not hold a whole number of pages.
    #[error("file length {file_length} is not a multiple of the page size")]
    PartialPage { file_length: u64 },

    /// Splitting a non-root leaf needs parent updates, which are not
    /// implemented.
    #[error("splitting non-root leaf {0} is not supported")]
    UnsupportedSplit(PageId),

    /// Insert into a full leaf while splitting is disabled.
    #[error("table full ({max_cells} cells)")]
    CapacityExceeded { max_cells: u32 },

    /// A row field does not fit its fixed-width column.
    #[error("{field} is {len} bytes, column holds at most {max}")]
    StringTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

impl Error {
    /// True for errors that signal a corrupt tree, a bug, or a structural
    /// operation this engine cannot perform.
    ///
    /// Such errors abort the current operation and should not be retried.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::PageOutOfRange { .. }
                | Error::CellOutOfRange { .. }
                | Error::ChildOutOfRange { .. }
                | Error::ChildPageOutOfRange { .. }
                | Error::TreeCycle { .. }
                | Error::InvalidNodeType(_)
                | Error::UnexpectedNodeType { .. }
                | Error::PageNotCached(_)
                | Error::PartialPage { .. }
                | Error::UnsupportedSplit(_)
        )
    }
}
