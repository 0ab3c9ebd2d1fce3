//! StrataDB - a single-table, disk-backed B-tree store.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            StrataDB                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Shell (repl/ + main.rs)                     │   │
//! │  │        prepare_statement → Session::run_line             │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Table (table.rs)                         │   │
//! │  │        open / insert / scan / render_tree / close        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              B-tree (index/btree/)                       │   │
//! │  │    tree engine + Cursor over LeafNode / InternalNode     │   │
//! │  │               rows encoded by record.rs                  │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                  Pager (pager/)                          │   │
//! │  │        page cache + append-only allocation + stats       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Storage Layer (storage/)                    │   │
//! │  │            DiskManager + Page + PageHeader               │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, Error, config)
//! - [`storage`] - Disk I/O and page formats
//! - [`pager`] - Page cache
//! - [`index`] - The B-tree
//! - [`record`] - Fixed-width row codec
//! - [`table`] - Table lifecycle and operations
//! - [`repl`] - Line-oriented shell
//!
//! # Quick Start
//! ```no_run
//! use stratadb::{Row, Table};
//!
//! let mut table = Table::open("users.db")?;
//! table.insert(&Row::new(1, "alice", "alice@example.com")?)?;
//!
//! let mut cursor = table.start()?;
//! while !cursor.is_end() {
//!     println!("{}", cursor.row()?);
//!     cursor.advance()?;
//! }
//! drop(cursor);
//! table.close()?;
//! # Ok::<(), stratadb::Error>(())
//! ```

pub mod common;
pub mod index;
pub mod pager;
pub mod record;
pub mod repl;
pub mod storage;
pub mod table;

// Re-export commonly used items at crate root for convenience
pub use common::config::{SplitPolicy, TableOptions, PAGE_SIZE, TABLE_MAX_PAGES};
pub use common::{Error, PageId, Result};

pub use index::btree::Cursor;
pub use pager::{Pager, StatsSnapshot};
pub use record::Row;
pub use storage::page::{NodeType, Page, PageHeader};
pub use table::{ExecuteResult, Table};
