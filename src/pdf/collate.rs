//! Page collation: gather pages from every eligible PDF in a folder, order
//! them by a content-derived key, and assemble exact copies into one
//! output PDF.
//!
//! Output assembly is based on the lopdf merge example:
//! https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};
use crate::extract::{extract_code, first_line, last_line};
use crate::pdf::scan::{file_name, list_pdfs, page_texts};
use crate::tally::Tally;

/// Filename marker for PDFs that are already multi-page composites.
/// Matched case-insensitively; marked files are never collated again.
pub const COMPOSITE_MARKER: &str = "multi-page";

/// How pages are ordered in the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortPolicy {
    /// Ascending by each page's first non-empty line, case-insensitive.
    FirstLine,
    /// Two tiers: pages whose code occurs exactly once come first, then
    /// everything else (including pages with no code). Each tier is
    /// ordered ascending by code, case-insensitive. Requires a tally.
    CodeTier,
}

/// Options for one collation run.
#[derive(Debug, Clone)]
pub struct CollateOptions {
    /// Folder containing the source PDFs
    pub folder: PathBuf,
    /// Path for the combined output PDF
    pub output_path: PathBuf,
    /// Page ordering policy
    pub policy: SortPolicy,
    /// Trace each page's sort key while reading
    pub verbose: bool,
}

/// One page queued for the output document.
///
/// `page_id` refers to the page object after its source document has been
/// renumbered into the shared output object space. The record only lives
/// for the duration of one collation pass.
struct PageRecord {
    /// (tier, text). FirstLine always uses tier 0; CodeTier uses the
    /// occurrence bucket. Tuple ordering gives the two-tier sort for free.
    key: (u8, String),
    page_id: ObjectId,
    source: String,
    page_num: usize,
}

/// Sort key for one page under the given policy.
fn page_key(policy: SortPolicy, text: &str, tally: Option<&Tally>) -> (u8, String) {
    match policy {
        SortPolicy::FirstLine => (0, first_line(text).to_lowercase()),
        SortPolicy::CodeTier => {
            let code = extract_code(last_line(text)).unwrap_or("");
            let count = tally.map(|t| t.count(code)).unwrap_or(0);
            let tier = if count == 1 { 0 } else { 1 };
            (tier, code.to_lowercase())
        }
    }
}

/// Collate pages from every eligible PDF in a folder into one output PDF.
///
/// Eligible documents are those whose filename does not contain
/// [`COMPOSITE_MARKER`]. Documents are visited in lexicographic filename
/// order, pages in source order; the sort is stable, so pages with equal
/// keys keep that relative order. A document that fails to read is
/// reported and skipped.
///
/// Returns the number of pages written. With no eligible documents,
/// nothing is written and 0 is returned.
pub fn collate(options: &CollateOptions, tally: Option<&Tally>) -> Result<usize> {
    if options.policy == SortPolicy::CodeTier && tally.is_none() {
        return Err(Error::General(
            "code-tier ordering requires a code tally".to_string(),
        ));
    }

    let pdf_files: Vec<PathBuf> = list_pdfs(&options.folder)?
        .into_iter()
        .filter(|path| !file_name(path).to_lowercase().contains(COMPOSITE_MARKER))
        .collect();

    if pdf_files.is_empty() {
        eprintln!("No PDF files to combine (after filtering)");
        return Ok(0);
    }

    eprintln!(
        "Combining {} PDF file(s) (excluding '{}' files)",
        pdf_files.len(),
        COMPOSITE_MARKER
    );

    // All source objects get renumbered into one shared ID space, exactly
    // like a whole-document merge; sorting then only shuffles page refs.
    let mut max_id = 1;
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut records: Vec<PageRecord> = Vec::new();

    for path in &pdf_files {
        if options.verbose {
            eprintln!("Reading: {}", file_name(path));
        }

        match scan_document(path, options.policy, tally, max_id) {
            Ok(scanned) => {
                max_id = scanned.next_id;
                objects.extend(scanned.objects);
                if options.verbose {
                    for record in &scanned.records {
                        eprintln!(
                            "  {} page {}: key '{}'",
                            record.source, record.page_num, record.key.1
                        );
                    }
                }
                records.extend(scanned.records);
            }
            Err(e) => eprintln!("Error reading {}: {}", file_name(path), e),
        }
    }

    // Stable sort: pages with identical keys retain document/page order.
    records.sort_by(|a, b| a.key.cmp(&b.key));

    match options.policy {
        SortPolicy::FirstLine => {
            eprintln!("Sorted {} pages alphabetically by first line", records.len());
        }
        SortPolicy::CodeTier => {
            let singles = records.iter().filter(|r| r.key.0 == 0).count();
            eprintln!("Sorted {} pages:", records.len());
            eprintln!("  - Single occurrence codes (sorted A-Z): {}", singles);
            eprintln!(
                "  - Multiple occurrence codes (sorted A-Z): {}",
                records.len() - singles
            );
        }
    }

    write_output(&records, objects, max_id, &options.output_path)?;

    eprintln!("Combined PDF saved to: {}", options.output_path.display());

    Ok(records.len())
}

/// Pages and objects of one source document, renumbered to start at
/// `first_id`.
struct ScannedDocument {
    records: Vec<PageRecord>,
    objects: BTreeMap<ObjectId, Object>,
    next_id: u32,
}

/// Load one document, renumber its objects, and build a PageRecord per
/// page. Any failure here (unreadable PDF, text extraction) is isolated
/// to this document by the caller.
fn scan_document(
    path: &Path,
    policy: SortPolicy,
    tally: Option<&Tally>,
    first_id: u32,
) -> Result<ScannedDocument> {
    let texts = page_texts(path)?;

    let mut doc = Document::load(path).map_err(|e| Error::DocumentRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    doc.renumber_objects_with(first_id);
    let next_id = doc.max_id + 1;

    let source = file_name(path);
    let mut records = Vec::new();

    // get_pages() is keyed by page number, so iteration preserves the
    // source page order.
    for (index, (_, page_id)) in doc.get_pages().into_iter().enumerate() {
        let text = texts.get(index).map(String::as_str).unwrap_or("");
        records.push(PageRecord {
            key: page_key(policy, text, tally),
            page_id,
            source: source.clone(),
            page_num: index + 1,
        });
    }

    Ok(ScannedDocument {
        records,
        objects: doc.objects,
        next_id,
    })
}

/// Assemble the ordered pages into a new document and save it.
///
/// Builds a fresh catalog and pages tree whose Kids array lists the page
/// references in collation order; page contents are untouched.
fn write_output(
    records: &[PageRecord],
    objects: BTreeMap<ObjectId, Object>,
    max_id: u32,
    output_path: &Path,
) -> Result<()> {
    let mut output = Document::with_version("1.5");

    output.objects.extend(objects);

    // max_id must cover the copied objects, otherwise new_object_id()
    // would hand out colliding IDs for the catalog and pages tree.
    output.max_id = max_id.saturating_sub(1);

    let pages_id = output.new_object_id();

    let kids: Vec<Object> = records
        .iter()
        .map(|record| Object::Reference(record.page_id))
        .collect();

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(records.len() as i64));
    pages_dict.set("Kids", Object::Array(kids));

    let catalog_id = output.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    output.objects.insert(catalog_id, Object::Dictionary(catalog));
    output.objects.insert(pages_id, Object::Dictionary(pages_dict));
    output.trailer.set("Root", Object::Reference(catalog_id));

    // Reparent every copied page onto the new pages tree
    for record in records {
        if let Ok(Object::Dictionary(ref mut dict)) = output.get_object_mut(record.page_id) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    output.compress();
    output.save(output_path)?;

    Ok(())
}
