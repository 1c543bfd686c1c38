//! pdfjuggle - page-level editing of PDF documents.
//!
//! The core of the crate is [`copy`], which deep-copies object graphs
//! between documents. The page operations build on it:
//! - [`pages`] inserts, removes and rotates pages
//! - [`impose`] lays pages out n-up on new sheets
//! - [`metadata`] reads and writes the document information dictionary
//!
//! [`dump`] prints single objects for inspection.
//!
//! [`io`] loads and saves documents; [`cli`], [`config`] and [`output`]
//! back the `pdfjuggle` binary.

pub mod cli;
pub mod config;
pub mod copy;
pub mod dump;
pub mod error;
pub mod impose;
pub mod io;
pub mod metadata;
pub mod output;
pub mod pages;

pub use error::{JuggleError, Result};

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
