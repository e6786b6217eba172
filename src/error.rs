//! Error types for the pdf-collate library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the pdf-collate library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF structure error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input path is not a directory
    #[error("'{}' is not a valid directory", .0.display())]
    NotADirectory(PathBuf),

    /// A single document could not be read. Folder loops catch this per
    /// file and keep going; the document contributes nothing.
    #[error("failed to read {}: {reason}", .path.display())]
    DocumentRead { path: PathBuf, reason: String },

    /// Target workbook does not have enough sheets for an in-place update
    #[error("spreadsheet must have at least 2 sheets")]
    MissingSheet,

    /// Spreadsheet read/write error
    #[error("spreadsheet error: {0}")]
    Sheet(String),

    /// File not found
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid glob pattern
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// General error
    #[error("{0}")]
    General(String),
}
