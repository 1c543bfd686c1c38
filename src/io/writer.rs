//! PDF writing.
//!
//! This module provides safe PDF writing with:
//! - Atomic writes (write to temp file, then rename)
//! - Optional stream compression
//! - Pruning of objects no longer reachable from the trailer
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdfjuggle::io::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(&doc, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use log::debug;
use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use super::format_file_size;
use crate::error::{JuggleError, Result};

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Compress streams that allow it. Copied payloads are never re-encoded.
    pub compress: bool,

    /// Drop objects that are no longer reachable, such as removed pages.
    pub prune: bool,

    /// Renumber objects densely from 1.
    pub renumber: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compress: true,
            prune: true,
            renumber: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Whether compression was applied.
    pub compressed: bool,

    /// Number of unreachable objects dropped.
    pub pruned_objects: usize,

    /// Number of objects written.
    pub object_count: usize,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer without compression.
    pub fn without_compression() -> Self {
        Self::with_options(WriteOptions {
            compress: false,
            ..Default::default()
        })
    }

    /// Save a PDF document to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be created or written.
    pub async fn save(&self, doc: &Document, path: &Path) -> Result<()> {
        self.save_with_stats(doc, path).await.map(|_| ())
    }

    /// Save a PDF and return statistics about the operation.
    ///
    /// The document is cloned; `doc` itself is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be created or written, or if
    /// the atomic rename fails.
    pub async fn save_with_stats(&self, doc: &Document, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();
        let mut doc = doc.clone();

        task::spawn_blocking(move || write_document(&mut doc, path_buf, &options))
            .await
            .map_err(|e| JuggleError::other(format!("Write task failed: {e}")))?
    }

    /// Check if a file can be written to the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory does not exist or is read-only.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        let metadata = tokio::fs::metadata(parent).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                JuggleError::invalid_config(format!(
                    "Output directory does not exist: {}",
                    parent.display()
                ))
            } else {
                JuggleError::FileNotAccessible {
                    path: parent.to_path_buf(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_dir() {
            return Err(JuggleError::invalid_config(format!(
                "Output parent is not a directory: {}",
                parent.display()
            )));
        }

        if metadata.permissions().readonly() {
            return Err(JuggleError::invalid_config(format!(
                "Output directory is not writable: {}",
                parent.display()
            )));
        }

        Ok(())
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

fn write_document(
    doc: &mut Document,
    path: PathBuf,
    options: &WriteOptions,
) -> Result<WriteStatistics> {
    let start = Instant::now();

    let pruned_objects = if options.prune {
        doc.prune_objects().len()
    } else {
        0
    };

    if options.renumber {
        doc.renumber_objects();
    }

    if options.compress {
        doc.compress();
    }

    let write_path = if options.atomic {
        temp_path_for(&path)
    } else {
        path.clone()
    };

    let file =
        std::fs::File::create(&write_path).map_err(|e| JuggleError::FailedToCreateOutput {
            path: write_path.clone(),
            source: e,
        })?;

    let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);

    doc.save_to(&mut writer)
        .map_err(|e| JuggleError::FailedToWrite {
            path: write_path.clone(),
            source: std::io::Error::other(e),
        })?;

    writer.flush().map_err(|e| JuggleError::FailedToWrite {
        path: write_path.clone(),
        source: e,
    })?;
    drop(writer);

    if options.atomic {
        if let Err(e) = std::fs::rename(&write_path, &path) {
            let _ = std::fs::remove_file(&write_path);
            return Err(JuggleError::FailedToWrite { path, source: e });
        }
    }

    let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    let write_time = start.elapsed();
    debug!(
        "wrote {} ({} objects, {} pruned) in {:?}",
        path.display(),
        doc.objects.len(),
        pruned_objects,
        write_time
    );

    Ok(WriteStatistics {
        write_time,
        file_size,
        output_path: path,
        compressed: options.compress,
        pruned_objects,
        object_count: doc.objects.len(),
    })
}

/// Sibling temp file, so the final rename stays on one filesystem.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.pdf".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
