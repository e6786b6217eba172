//! PDF Collate Library
//!
//! Batch-processes a folder of PDF files. This library provides
//! functionality to:
//! - Extract 3-character trailer codes from the last line of every page
//! - Tally code occurrences across a whole folder
//! - Collate pages from all eligible PDFs into one output PDF, ordered by
//!   first-line text or by occurrence tier and code
//! - Sync the tally into an xlsx workbook (update in place or create new)
//!
//! # Example
//!
//! ```no_run
//! use pdf_collate::pdf::{collate, CollateOptions, SortPolicy};
//! use pdf_collate::tally::tally_folder;
//! use std::path::PathBuf;
//!
//! let folder = PathBuf::from("./pdfs");
//! let tally = tally_folder(&folder, false).expect("Failed to tally codes");
//!
//! let options = CollateOptions {
//!     folder: folder.clone(),
//!     output_path: folder.join("combined_alphabetical.pdf"),
//!     policy: SortPolicy::FirstLine,
//!     verbose: false,
//! };
//!
//! collate(&options, Some(&tally)).expect("Failed to collate pages");
//! ```

pub mod error;
pub mod extract;
pub mod pdf;
pub mod sheet;
pub mod tally;

// Re-export commonly used items
pub use error::{Error, Result};
