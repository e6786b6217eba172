//! PDF folder scanning and page collation

pub mod collate;
pub mod scan;

// Re-export commonly used items
pub use collate::{collate, CollateOptions, SortPolicy, COMPOSITE_MARKER};
pub use scan::{file_name, find_workbook, list_pdfs, page_texts};
