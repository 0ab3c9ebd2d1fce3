//! Table - the single keyed table and its open/close lifecycle.

use std::path::Path;

use tracing::info;

use crate::common::config::TableOptions;
use crate::common::{PageId, Result};
use crate::index::btree::node::LeafNode;
use crate::index::btree::{self, printer, Cursor};
use crate::pager::Pager;
use crate::record::Row;

/// Outcome of a successful insert call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteResult {
    Success,
    /// The key was already present; nothing was written.
    DuplicateKey,
}

/// A table of [`Row`]s keyed by `Row::id`, stored as a B-tree in one file.
///
/// The table owns its [`Pager`]; nothing reaches the file until
/// [`Table::close`], which writes back every cached page.
///
/// # Example
/// ```no_run
/// use stratadb::{ExecuteResult, Row, Table};
///
/// let mut table = Table::open("users.db")?;
/// let row = Row::new(1, "alice", "alice@example.com")?;
/// assert_eq!(table.insert(&row)?, ExecuteResult::Success);
/// assert_eq!(table.select_all()?, vec![row]);
/// table.close()?;
/// # Ok::<(), stratadb::Error>(())
/// ```
pub struct Table {
    root_page_id: PageId,
    pager: Pager,
    options: TableOptions,
}

impl Table {
    /// Open (or create) a table with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, TableOptions::default())
    }

    /// Open (or create) a table.
    ///
    /// A new, empty file gets page 0 formatted as an empty root leaf.
    ///
    /// # Errors
    /// - `Error::Io` if the file cannot be opened
    /// - `Error::PartialPage` if the file has a trailing partial page
    /// - `Error::PageOutOfRange` if `options.max_pages` is zero
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: TableOptions) -> Result<Self> {
        let path = path.as_ref();
        let mut pager = Pager::open(path, options.max_pages)?;

        if pager.num_pages() == 0 {
            let root = pager.get_page(PageId::ROOT)?;
            let mut guard = root.write();
            let mut leaf = LeafNode::initialize(&mut *guard);
            leaf.set_root(true);
        }

        info!(
            path = %path.display(),
            num_pages = pager.num_pages(),
            "table opened"
        );

        Ok(Self {
            root_page_id: PageId::ROOT,
            pager,
            options,
        })
    }

    /// Write back every cached page and release the file.
    pub fn close(self) -> Result<()> {
        let num_pages = self.pager.num_pages();
        self.pager.close(self.options.sync_on_close)?;
        info!(num_pages, "table closed");
        Ok(())
    }

    /// Insert `row` keyed by its id.
    ///
    /// # Errors
    /// See [`btree::insert`].
    pub fn insert(&mut self, row: &Row) -> Result<ExecuteResult> {
        btree::insert(self, row.id, row)
    }

    /// Cursor at `key`, or where `key` would be inserted.
    pub fn find(&mut self, key: u32) -> Result<Cursor<'_>> {
        btree::find(self, key)
    }

    /// Cursor at the first row in key order.
    pub fn start(&mut self) -> Result<Cursor<'_>> {
        Cursor::start(self)
    }

    /// Alias of [`Table::start`].
    pub fn scan(&mut self) -> Result<Cursor<'_>> {
        self.start()
    }

    /// Every row in ascending key order.
    pub fn select_all(&mut self) -> Result<Vec<Row>> {
        let mut cursor = self.start()?;
        let mut rows = Vec::new();
        while !cursor.is_end() {
            rows.push(cursor.row()?);
            cursor.advance()?;
        }
        Ok(rows)
    }

    /// Indented dump of the tree shape.
    pub fn render_tree(&mut self) -> Result<String> {
        printer::render_tree(&mut self.pager, self.root_page_id)
    }

    #[inline]
    pub fn root_page_id(&self) -> PageId {
        self.root_page_id
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }
}
