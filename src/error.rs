//! Error types for the PDF catalog library
//!
//! Only document-level failures are errors. Missing or malformed objects inside
//! an opened document are reported as absent values, never through this type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF catalog library
#[derive(Error, Debug)]
pub enum Error {
    /// The input is not a PDF lopdf can parse
    #[error("Unable to open PDF: {0}")]
    UnableToOpen(#[source] lopdf::Error),

    /// Document is encrypted and no working password was supplied
    #[error("PDF is encrypted and requires a password")]
    PasswordRequired,

    /// The supplied password did not unlock the document
    #[error("Could not unlock PDF with the supplied password")]
    CouldNotUnlock,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A traversal was cancelled through its token
    #[error("Traversal cancelled")]
    Cancelled,

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// No files matched pattern
    #[error("No PDF files found matching pattern: {0}")]
    NoFilesMatched(String),
}
