//! Page types and layout.
//!
//! This module contains:
//! - [`Page`] - The raw 4KB data container
//! - [`PageHeader`] - Common node header at the start of every page
//! - [`NodeType`] - Leaf / internal discriminator

#[allow(clippy::module_inception)]
mod page;
mod page_header;

pub use page::Page;
pub use page_header::{NodeType, PageHeader};
