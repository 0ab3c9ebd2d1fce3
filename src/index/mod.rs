//! Index structures.
//!
//! - [`btree`] - The table's B-tree: node codec, engine, cursor

pub mod btree;
