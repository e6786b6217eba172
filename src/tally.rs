//! Code tallying across the pages of one document or a whole folder.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::extract::{extract_code, last_line};
use crate::pdf::scan::{file_name, list_pdfs, page_texts};

/// Occurrence counts per code.
///
/// Backed by a `BTreeMap` so iteration is always in ascending code order,
/// which is the deterministic order the spreadsheet reconciler and the
/// alphabetical report rely on.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tally {
    counts: BTreeMap<String, u64>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of a code.
    pub fn record(&mut self, code: &str) {
        *self.counts.entry(code.to_string()).or_insert(0) += 1;
    }

    /// Count for a code, 0 if never seen.
    pub fn count(&self, code: &str) -> u64 {
        self.counts.get(code).copied().unwrap_or(0)
    }

    /// Number of distinct codes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all occurrence counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Entries in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(code, &count)| (code.as_str(), count))
    }

    /// Entries by descending count, ties broken by ascending code.
    pub fn by_count_desc(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        entries
    }
}

/// Tally trailer codes from the last line of every page of one PDF.
///
/// Pages with no text, no last line, or no matching code contribute
/// nothing; under `verbose` each page's outcome is traced.
pub fn tally_document(path: &Path, tally: &mut Tally, verbose: bool) -> Result<()> {
    let pages = page_texts(path)?;

    for (index, text) in pages.iter().enumerate() {
        let page_num = index + 1;
        let line = last_line(text);

        if line.is_empty() {
            if verbose {
                eprintln!("  Page {}: no text found", page_num);
            }
            continue;
        }

        match extract_code(line) {
            Some(code) => {
                tally.record(code);
                if verbose {
                    eprintln!("  Page {}: found code '{}'", page_num, code);
                }
            }
            None => {
                if verbose {
                    eprintln!("  Page {}: no code found in: {}", page_num, line);
                }
            }
        }
    }

    Ok(())
}

/// Tally trailer codes across every PDF in a folder.
///
/// Documents are visited in lexicographic filename order. A document that
/// fails to read is reported and skipped; the tally over the remaining
/// documents is still returned.
pub fn tally_folder(folder: &Path, verbose: bool) -> Result<Tally> {
    let pdf_files = list_pdfs(folder)?;

    let mut tally = Tally::new();

    if pdf_files.is_empty() {
        eprintln!("No PDF files found in {}", folder.display());
        return Ok(tally);
    }

    eprintln!("Found {} PDF file(s)", pdf_files.len());

    for path in &pdf_files {
        eprintln!("Processing: {}", file_name(path));
        if let Err(e) = tally_document(path, &mut tally, verbose) {
            eprintln!("  Error processing {}: {}", file_name(path), e);
        }
    }

    Ok(tally)
}
