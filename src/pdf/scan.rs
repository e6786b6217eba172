//! Folder scanning and per-page text extraction.
//!
//! This is the only module that touches the raw text extractor. Everything
//! downstream works with the trimmed line strings from [`crate::extract`].

use std::panic;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// List the PDF files in a folder, lexicographically by filename.
///
/// Non-PDF files are ignored. Fails with [`Error::NotADirectory`] before
/// any processing when the path is not a folder.
pub fn list_pdfs(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(Error::NotADirectory(folder.to_path_buf()));
    }

    let pattern = folder.join("*.pdf");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| Error::InvalidGlob(pattern.display().to_string()))?;

    let mut paths = Vec::new();
    for entry in glob::glob(pattern).map_err(|e| Error::InvalidGlob(e.to_string()))? {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => eprintln!("Warning: glob error: {}", e),
        }
    }

    // Sort paths for consistent ordering
    paths.sort();

    Ok(paths)
}

/// First `.xlsx` file in the folder, lexicographically, if any.
pub fn find_workbook(folder: &Path) -> Option<PathBuf> {
    let pattern = folder.join("*.xlsx");
    let pattern = pattern.to_str()?;
    glob::glob(pattern).ok()?.flatten().next()
}

/// Extract the text of every page of a PDF, in page order.
///
/// pdf-extract can panic on malformed files, so the call is wrapped in
/// `catch_unwind` and surfaced as a [`Error::DocumentRead`] instead.
pub fn page_texts(path: &Path) -> Result<Vec<String>> {
    let path_buf = path.to_path_buf();
    let extracted = panic::catch_unwind(move || pdf_extract::extract_text_by_pages(&path_buf));

    match extracted {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(Error::DocumentRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
        Err(_) => Err(Error::DocumentRead {
            path: path.to_path_buf(),
            reason: "text extraction panicked".to_string(),
        }),
    }
}

/// File name component as a displayable string.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
