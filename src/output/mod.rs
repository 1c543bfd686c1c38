//! Output formatting and display for pdfjuggle.
//!
//! This module handles all user-facing output including:
//! - Formatted status messages
//! - Document summaries, as text or JSON
//! - Write reports
//! - Quiet and verbose modes
//!
//! # Examples
//!
//! ```no_run
//! use pdfjuggle::config::Config;
//! use pdfjuggle::output::OutputFormatter;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Rotating pages...");
//! formatter.success("Done");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use serde::Serialize;
use std::path::PathBuf;

use crate::config::Metadata;
use crate::io::{LoadedPdf, WriteStatistics, format_file_size};
use crate::metadata::read_metadata;

/// What `info` reports about a document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    /// File the document was loaded from.
    pub path: PathBuf,
    /// PDF version from the header.
    pub version: String,
    /// Number of pages.
    pub page_count: usize,
    /// Number of indirect objects.
    pub object_count: usize,
    /// File size in bytes.
    pub file_size: u64,
    /// Document information dictionary.
    pub metadata: Metadata,
}

impl DocumentSummary {
    /// Summarize a loaded document.
    pub fn from_loaded(loaded: &LoadedPdf) -> Self {
        Self {
            path: loaded.path.clone(),
            version: loaded.document.version.clone(),
            page_count: loaded.page_count,
            object_count: loaded.document.objects.len(),
            file_size: loaded.file_size,
            metadata: read_metadata(&loaded.document),
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Display a document summary as labelled fields.
pub fn display_summary(formatter: &OutputFormatter, summary: &DocumentSummary) {
    formatter.section(&summary.path.display().to_string());
    formatter.field("Version", &summary.version);
    formatter.field("Pages", &summary.page_count.to_string());
    formatter.field("Objects", &summary.object_count.to_string());
    formatter.field("Size", &format_file_size(summary.file_size));

    for (key, value) in summary.metadata.fields() {
        if let Some(value) = value {
            formatter.field(key, value);
        }
    }
}

/// Display the outcome of writing an output file.
pub fn display_write_statistics(formatter: &OutputFormatter, stats: &WriteStatistics) {
    formatter.success(&format!(
        "Wrote {} ({})",
        stats.output_path.display(),
        stats.format_file_size()
    ));

    formatter.detail("Objects", &stats.object_count.to_string());
    formatter.detail("Pruned", &stats.pruned_objects.to_string());
    formatter.detail(
        "Write time",
        &format!("{:.2}s", stats.write_time.as_secs_f64()),
    );
    formatter.detail("Compression", if stats.compressed { "Yes" } else { "No" });
}
