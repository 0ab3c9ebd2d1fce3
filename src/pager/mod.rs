//! Page cache.
//!
//! The pager mediates between in-memory node buffers and the table file.
//!
//! # Components
//! - [`Pager`] - Page cache, allocation, and write-back
//! - [`PageRef`] - Shared handle to one cached page
//! - [`PagerStats`] - Cache and I/O counters

#[allow(clippy::module_inception)]
mod pager;
mod stats;

pub use pager::{PageRef, Pager};
pub use stats::{PagerStats, StatsSnapshot};
