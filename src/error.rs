//! Error types for pdfjuggle.
//!
//! Every fallible operation outside the copy engine returns [`Result`].
//! The copy engine itself never fails: degraded nodes are logged and
//! replaced (see [`crate::copy`]).
//!
//! # Error Categories
//!
//! - **I/O Errors**: file not found, permission denied, write failures
//! - **PDF Errors**: unreadable, encrypted or structurally broken documents
//! - **Page Errors**: indices and ranges that do not fit the page tree
//! - **Configuration Errors**: invalid arguments or option combinations

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfjuggle operations.
pub type Result<T> = std::result::Result<T, JuggleError>;

/// Main error type for pdfjuggle operations.
#[derive(Debug, thiserror::Error)]
pub enum JuggleError {
    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Path exists but is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Input file is not accessible (permission denied, etc.).
    #[error("Cannot access file: {}\n  Reason: {source}", path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse a PDF file.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF file is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        path.display()
    )]
    EncryptedPdf {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// Document has no usable page tree.
    #[error("Document has no pages")]
    NoPages,

    /// A page index lies outside the document.
    #[error("Page {} does not exist (document has {page_count} page(s))", index + 1)]
    InvalidPageIndex {
        /// 0-based index that was requested.
        index: usize,
        /// Number of pages in the document.
        page_count: usize,
    },

    /// A page range does not select any page of the document.
    #[error(
        "Invalid page range '{range}'\n  \
         PDF has {total_pages} page(s). Page numbers must be between 1 and {total_pages}"
    )]
    InvalidPageRange {
        /// Requested page range.
        range: String,
        /// Total pages in the PDF.
        total_pages: usize,
    },

    /// Rotation is not a multiple of 90 in 0..=270.
    #[error("Invalid rotation: {degrees}. Must be 0, 90, 180 or 270")]
    InvalidRotation {
        /// Requested rotation.
        degrees: i64,
    },

    /// Removal would leave the document without pages.
    #[error("Cannot remove every page of a document")]
    CannotRemoveAllPages,

    /// The page tree is structurally unusable.
    #[error("Malformed page tree: {reason}")]
    MalformedPageTree {
        /// What is wrong with the tree.
        reason: String,
    },

    /// No object with this number and generation exists.
    #[error("Object {number} {generation} R does not exist")]
    ObjectNotFound {
        /// Object number.
        number: u32,
        /// Generation number.
        generation: u16,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Metadata operation failed.
    #[error("Failed to set metadata: {reason}")]
    MetadataFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Error reported by the PDF object store.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<anyhow::Error> for JuggleError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<JuggleError>() {
            Ok(inner) => inner,
            Err(err) => Self::other(format!("{err:#}")),
        }
    }
}

impl JuggleError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(path: PathBuf) -> Self {
        Self::EncryptedPdf { path }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a MalformedPageTree error.
    pub fn malformed_page_tree(reason: impl Into<String>) -> Self {
        Self::MalformedPageTree {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error concerns a single input and the rest of a batch
    /// could still be processed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FailedToLoadPdf { .. }
                | Self::EncryptedPdf { .. }
                | Self::NoPages
                | Self::InvalidPageIndex { .. }
                | Self::InvalidPageRange { .. }
                | Self::MalformedPageTree { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } | Self::NotAFile { .. } | Self::FileNotAccessible { .. } => 2,
            Self::FailedToLoadPdf { .. } | Self::EncryptedPdf { .. } | Self::Pdf(_) => 3,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } | Self::FailedToWrite { .. } | Self::Io { .. } => 5,
            Self::NoPages
            | Self::MalformedPageTree { .. }
            | Self::MetadataFailed { .. }
            | Self::ObjectNotFound { .. } => 6,
            Self::InvalidPageIndex { .. }
            | Self::InvalidPageRange { .. }
            | Self::InvalidRotation { .. }
            | Self::CannotRemoveAllPages
            | Self::InvalidConfig { .. }
            | Self::Other { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
        }
    }
}
