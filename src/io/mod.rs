//! Document I/O for pdfjuggle.
//!
//! This module handles all file I/O:
//! - Loading PDF documents from disk (rejecting encrypted files)
//! - Loading several inputs concurrently
//! - Writing edited documents atomically
//!
//! # Examples
//!
//! ```no_run
//! use pdfjuggle::io::{PdfReader, PdfWriter};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loaded = PdfReader::new().load(&PathBuf::from("input.pdf")).await?;
//! PdfWriter::new()
//!     .save(&loaded.document, &PathBuf::from("output.pdf"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
