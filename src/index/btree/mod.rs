//! B-tree over fixed-size pages.
//!
//! # Components
//! - [`node`] - Typed leaf/internal views over page bytes
//! - [`tree`] - Search, insert, leaf split, root promotion
//! - [`Cursor`] - Position within the leaf level
//! - [`printer`] - Tree-shape dump and layout constants

mod cursor;
pub mod node;
pub mod printer;
mod tree;

pub use cursor::Cursor;
pub use tree::{find, insert};
