//! Page tree operations.
//!
//! This module edits the page tree of a loaded document:
//! - Navigation: page lookup, ancestors, inherited attributes
//! - Inserting every page of another document
//! - Removing single pages, spans or page ranges
//! - Reading and changing page rotation
//!
//! Page indices are 0-based throughout; [`PageRange`](crate::config::PageRange)
//! values are 1-based as typed on the command line.

mod insert;
mod remove;
mod rotate;
mod tree;

pub use insert::{InsertStatistics, insert_pages};
pub use remove::{remove_page, remove_page_span, remove_pages};
pub use rotate::{page_rotation, rotate_pages, set_page_rotation};
pub use tree::{ancestors, inherited_attribute, page_count, page_id, page_ids, parent_of, root_pages_id};
