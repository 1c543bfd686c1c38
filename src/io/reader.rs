//! PDF loading.
//!
//! Parsing runs on tokio's blocking pool so the runtime stays responsive
//! while large files are read. Encrypted documents are rejected.
//!
//! # Examples
//!
//! ```no_run
//! use pdfjuggle::io::PdfReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let loaded = reader.load(&PathBuf::from("a.pdf")).await?;
//! println!("{} pages", loaded.page_count);
//! # Ok(())
//! # }
//! ```

use futures::stream::{self, StreamExt};
use log::debug;
use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use super::format_file_size;
use crate::error::{JuggleError, Result};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// File size in bytes.
    pub file_size: u64,

    /// Time taken to load the document.
    pub load_time: Duration,
}

impl LoadedPdf {
    /// File size as a human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF reader with configurable loading behavior.
#[derive(Debug, Clone, Copy)]
pub struct PdfReader {
    require_pages: bool,
}

impl PdfReader {
    /// Create a reader that rejects documents without pages.
    pub fn new() -> Self {
        Self {
            require_pages: true,
        }
    }

    /// Create a reader that accepts documents without pages.
    pub fn allow_empty() -> Self {
        Self {
            require_pages: false,
        }
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist or is not a regular file
    /// - The file is not a parseable PDF
    /// - The PDF is encrypted
    /// - The PDF has no pages and this reader requires them
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let path_buf = path.to_path_buf();

        let metadata = tokio::fs::metadata(&path_buf).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                JuggleError::file_not_found(path_buf.clone())
            } else {
                JuggleError::FileNotAccessible {
                    path: path_buf.clone(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_file() {
            return Err(JuggleError::not_a_file(path_buf));
        }

        let start = Instant::now();
        let load_path = path_buf.clone();
        let document = task::spawn_blocking(move || Document::load(&load_path))
            .await
            .map_err(|e| JuggleError::other(format!("Load task failed: {e}")))?
            .map_err(|e| {
                let message = e.to_string();
                let lower = message.to_lowercase();
                if lower.contains("encrypt") || lower.contains("password") {
                    JuggleError::encrypted_pdf(path_buf.clone())
                } else {
                    JuggleError::failed_to_load_pdf(path_buf.clone(), message)
                }
            })?;

        if document.trailer.has(b"Encrypt") {
            return Err(JuggleError::encrypted_pdf(path_buf));
        }

        let page_count = document.get_pages().len();
        if self.require_pages && page_count == 0 {
            return Err(JuggleError::failed_to_load_pdf(path_buf, "PDF has no pages"));
        }

        let load_time = start.elapsed();
        debug!(
            "loaded {} ({} pages, {} objects) in {:?}",
            path_buf.display(),
            page_count,
            document.objects.len(),
            load_time
        );

        Ok(LoadedPdf {
            document,
            path: path_buf,
            page_count,
            file_size: metadata.len(),
            load_time,
        })
    }

    /// Load several documents concurrently.
    ///
    /// At most `workers` files are parsed at once. Results come back in the
    /// order of `paths`, one per input.
    pub async fn load_many(&self, paths: &[PathBuf], workers: usize) -> Vec<Result<LoadedPdf>> {
        let reader = *self;
        stream::iter(paths.iter().cloned())
            .map(|path| async move { reader.load(&path).await })
            .buffered(workers.max(1))
            .collect()
            .await
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}
