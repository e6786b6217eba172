//! Integration tests for the pdf-collate library
//!
//! Source PDFs are generated on the fly with lopdf (Helvetica text, one
//! Tj per line) so the whole pipeline runs against real files without
//! checked-in fixtures.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;

use pdf_collate::extract::{first_line, last_line};
use pdf_collate::pdf::{collate, page_texts, CollateOptions, SortPolicy};
use pdf_collate::tally::tally_folder;

/// Write a PDF with one entry per page; each entry's lines are laid out
/// top to bottom so text extraction sees them in order.
fn make_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page_text in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![50.into(), 750.into()]),
        ];
        for (i, line) in page_text.lines().enumerate() {
            if i > 0 {
                operations.push(Operation::new("Td", vec![0.into(), (-20).into()]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(line)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path).expect("save generated PDF");
}

fn output_page_count(path: &Path) -> usize {
    let doc = Document::load(path).expect("load output PDF");
    doc.get_pages().len()
}

#[test]
fn tally_counts_every_matching_trailer() {
    let dir = TempDir::new().expect("temp dir");
    make_pdf(
        &dir.path().join("a.pdf"),
        &[
            "Intro page\nAAA 1/1/22 ABCD",
            "Second page\nBBB 2/3/22 WXYZ",
        ],
    );
    make_pdf(&dir.path().join("b.pdf"), &["Another\nBBB 2/3/22 WXYZ"]);
    make_pdf(&dir.path().join("c.pdf"), &["No trailer on this page"]);

    let tally = tally_folder(dir.path(), false).expect("tally");

    assert_eq!(tally.count("AAA"), 1);
    assert_eq!(tally.count("BBB"), 2);
    assert_eq!(tally.len(), 2);
    // Sum of counts equals the number of pages with a matching trailer
    assert_eq!(tally.total(), 3);
}

#[test]
fn first_line_policy_sorts_pages_alphabetically() {
    let dir = TempDir::new().expect("temp dir");
    make_pdf(&dir.path().join("a.pdf"), &["Banana topic\nZZZ 1/1/22 ABCD"]);
    make_pdf(&dir.path().join("b.pdf"), &["Apple topic\nZZZ 1/1/22 ABCD"]);

    let output = dir.path().join("out.pdf");
    let options = CollateOptions {
        folder: dir.path().to_path_buf(),
        output_path: output.clone(),
        policy: SortPolicy::FirstLine,
        verbose: false,
    };
    let pages = collate(&options, None).expect("collate");

    assert_eq!(pages, 2);
    assert_eq!(output_page_count(&output), 2);

    let texts = page_texts(&output).expect("extract output text");
    assert_eq!(first_line(&texts[0]), "Apple topic");
    assert_eq!(first_line(&texts[1]), "Banana topic");
}

#[test]
fn first_line_policy_is_stable_for_equal_keys() {
    let dir = TempDir::new().expect("temp dir");
    make_pdf(&dir.path().join("a.pdf"), &["Same Title\nfrom-a"]);
    make_pdf(&dir.path().join("b.pdf"), &["Same Title\nfrom-b"]);

    let output = dir.path().join("out.pdf");
    let options = CollateOptions {
        folder: dir.path().to_path_buf(),
        output_path: output.clone(),
        policy: SortPolicy::FirstLine,
        verbose: false,
    };
    collate(&options, None).expect("collate");

    // Equal first lines keep filename order: a.pdf before b.pdf
    let texts = page_texts(&output).expect("extract output text");
    assert_eq!(last_line(&texts[0]), "from-a");
    assert_eq!(last_line(&texts[1]), "from-b");
}

#[test]
fn collation_is_idempotent_on_unchanged_input() {
    let dir = TempDir::new().expect("temp dir");
    make_pdf(&dir.path().join("a.pdf"), &["Cherry\nbody", "Apricot\nbody"]);
    make_pdf(&dir.path().join("b.pdf"), &["Blueberry\nbody"]);

    // Outputs land in a separate folder so the second run sees the same input
    let out_dir = TempDir::new().expect("output dir");
    let run = |name: &str| -> Vec<String> {
        let output = out_dir.path().join(name);
        let options = CollateOptions {
            folder: dir.path().to_path_buf(),
            output_path: output.clone(),
            policy: SortPolicy::FirstLine,
            verbose: false,
        };
        collate(&options, None).expect("collate");
        page_texts(&output)
            .expect("extract")
            .iter()
            .map(|t| first_line(t).to_string())
            .collect()
    };

    let first = run("first.pdf");
    let second = run("second.pdf");
    assert_eq!(first, vec!["Apricot", "Blueberry", "Cherry"]);
    assert_eq!(first, second);
}

#[test]
fn code_tier_policy_puts_single_occurrence_codes_first() {
    let dir = TempDir::new().expect("temp dir");
    // MMM occurs twice (a.pdf and c.pdf), AAA once
    make_pdf(&dir.path().join("a.pdf"), &["From a\nMMM 1/1/22 ABCD"]);
    make_pdf(&dir.path().join("b.pdf"), &["From b\nAAA 1/1/22 ABCD"]);
    make_pdf(&dir.path().join("c.pdf"), &["From c\nMMM 1/1/22 ABCD"]);

    let tally = tally_folder(dir.path(), false).expect("tally");
    assert_eq!(tally.count("MMM"), 2);
    assert_eq!(tally.count("AAA"), 1);

    let output = dir.path().join("out.pdf");
    let options = CollateOptions {
        folder: dir.path().to_path_buf(),
        output_path: output.clone(),
        policy: SortPolicy::CodeTier,
        verbose: false,
    };
    let pages = collate(&options, Some(&tally)).expect("collate");
    assert_eq!(pages, 3);

    let texts = page_texts(&output).expect("extract output text");
    // Tier 0: the single-occurrence AAA page; tier 1: MMM pages in
    // filename order
    assert_eq!(first_line(&texts[0]), "From b");
    assert_eq!(first_line(&texts[1]), "From a");
    assert_eq!(first_line(&texts[2]), "From c");
    assert_eq!(last_line(&texts[0]), "AAA 1/1/22 ABCD");
}

#[test]
fn excluded_composites_never_reach_the_output() {
    let dir = TempDir::new().expect("temp dir");
    make_pdf(&dir.path().join("a.pdf"), &["Keep me\nAAA 1/1/22 ABCD"]);
    make_pdf(
        &dir.path().join("old Multi-Page combined.pdf"),
        &["Drop me\nBBB 1/1/22 ABCD"],
    );

    // The tally still sees every PDF; only collation filters
    let tally = tally_folder(dir.path(), false).expect("tally");
    assert_eq!(tally.count("BBB"), 1);

    let output = dir.path().join("out.pdf");
    let options = CollateOptions {
        folder: dir.path().to_path_buf(),
        output_path: output.clone(),
        policy: SortPolicy::FirstLine,
        verbose: false,
    };
    let pages = collate(&options, Some(&tally)).expect("collate");

    assert_eq!(pages, 1);
    let texts = page_texts(&output).expect("extract output text");
    assert_eq!(first_line(&texts[0]), "Keep me");
}

#[test]
fn unreadable_documents_are_skipped_not_fatal() {
    let dir = TempDir::new().expect("temp dir");
    make_pdf(&dir.path().join("good.pdf"), &["Fine page\nAAA 1/1/22 ABCD"]);
    std::fs::write(dir.path().join("bad.pdf"), b"definitely not a pdf").unwrap();

    let tally = tally_folder(dir.path(), false).expect("tally");
    assert_eq!(tally.count("AAA"), 1);

    let output = dir.path().join("out.pdf");
    let options = CollateOptions {
        folder: dir.path().to_path_buf(),
        output_path: output.clone(),
        policy: SortPolicy::FirstLine,
        verbose: false,
    };
    let pages = collate(&options, None).expect("collate");
    assert_eq!(pages, 1);
}

#[test]
fn two_documents_same_code_end_to_end() {
    let dir = TempDir::new().expect("temp dir");
    make_pdf(&dir.path().join("a.pdf"), &["Banana topic\nZZZ 1/1/22 ABCD"]);
    make_pdf(&dir.path().join("b.pdf"), &["Apple topic\nZZZ 1/1/22 ABCD"]);

    let tally = tally_folder(dir.path(), false).expect("tally");
    assert_eq!(tally.count("ZZZ"), 2);
    assert_eq!(tally.len(), 1);

    // Policy B: both pages share code ZZZ with count 2, so both land in
    // tier 1 and keep their original filename order
    let output = dir.path().join("by_code.pdf");
    let options = CollateOptions {
        folder: dir.path().to_path_buf(),
        output_path: output.clone(),
        policy: SortPolicy::CodeTier,
        verbose: false,
    };
    let pages = collate(&options, Some(&tally)).expect("collate");
    assert_eq!(pages, 2);

    let texts = page_texts(&output).expect("extract output text");
    assert_eq!(first_line(&texts[0]), "Banana topic"); // a.pdf first
    assert_eq!(first_line(&texts[1]), "Apple topic");
}
