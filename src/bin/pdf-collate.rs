//! PDF Collate CLI tool
//!
//! A command-line tool for tallying trailer codes across a folder of PDFs,
//! syncing the counts to a spreadsheet, and combining pages into one PDF.

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};

use pdf_collate::pdf::{collate, find_workbook, page_texts, CollateOptions, SortPolicy};
use pdf_collate::sheet;
use pdf_collate::tally::{tally_document, tally_folder, Tally};

/// PDF Collate - count trailer codes and combine PDF pages in sorted order
#[derive(Parser)]
#[command(name = "pdf-collate")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Count trailer codes across a folder
    pdf-collate count ./pdfs --verbose

    # Count, update the folder's spreadsheet, and combine by first line
    pdf-collate batch ./pdfs

    # Combine by occurrence tier and write a fresh spreadsheet
    pdf-collate batch ./pdfs --create-spreadsheet --policy code-tier

    # Inspect a PDF's text line by line
    pdf-collate lines document.pdf")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count trailer codes across every PDF in a folder
    Count {
        /// Folder containing PDF files
        folder: PathBuf,

        /// Show detailed per-page processing information
        #[arg(long)]
        verbose: bool,
    },

    /// Count trailer codes in a single PDF
    CountFile {
        /// PDF file to scan
        input: PathBuf,

        /// Show detailed per-page processing information
        #[arg(long)]
        verbose: bool,
    },

    /// Print a PDF's text line by line for inspection
    Lines {
        /// PDF file to read
        input: PathBuf,
    },

    /// Count codes, sync a spreadsheet, and combine pages into one PDF
    Batch {
        /// Folder containing PDF files
        folder: PathBuf,

        /// Existing workbook to update with counts
        /// (default: first .xlsx found in the folder)
        #[arg(long)]
        spreadsheet: Option<PathBuf>,

        /// Create a new workbook in the folder instead of updating one
        #[arg(long, conflicts_with = "spreadsheet")]
        create_spreadsheet: bool,

        /// Skip the spreadsheet step entirely
        #[arg(long, conflicts_with_all = ["spreadsheet", "create_spreadsheet"])]
        no_spreadsheet: bool,

        /// Page ordering for the combined PDF
        /// (default: first-line, or code-tier with --create-spreadsheet)
        #[arg(long, value_enum)]
        policy: Option<Policy>,

        /// Output path for the combined PDF (default: inside the folder)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show detailed per-page processing information
        #[arg(long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Ascending by each page's first non-empty line
    FirstLine,
    /// Single-occurrence codes first, then the rest, each tier A-Z
    CodeTier,
}

impl From<Policy> for SortPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::FirstLine => SortPolicy::FirstLine,
            Policy::CodeTier => SortPolicy::CodeTier,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Count { folder, verbose } => cmd_count(folder, verbose),
        Commands::CountFile { input, verbose } => cmd_count_file(input, verbose),
        Commands::Lines { input } => cmd_lines(input),
        Commands::Batch {
            folder,
            spreadsheet,
            create_spreadsheet,
            no_spreadsheet,
            policy,
            output,
            verbose,
        } => cmd_batch(
            folder,
            spreadsheet,
            create_spreadsheet,
            no_spreadsheet,
            policy,
            output,
            verbose,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Default output filename inside the source folder, per policy.
/// These match the filenames the tool has always produced.
fn default_output_name(policy: SortPolicy) -> &'static str {
    match policy {
        SortPolicy::FirstLine => "combined_alphabetical.pdf",
        SortPolicy::CodeTier => "combined_single_page(print).pdf",
    }
}

/// Policy when none is given: creating a fresh spreadsheet pairs with
/// code-tier ordering, every other mode combines by first line.
fn default_policy(create_spreadsheet: bool) -> SortPolicy {
    if create_spreadsheet {
        SortPolicy::CodeTier
    } else {
        SortPolicy::FirstLine
    }
}

/// Print the tally: frequency listing first, then alphabetical.
fn print_code_results(tally: &Tally) {
    if tally.is_empty() {
        println!("\nNo codes found in any PDF.");
        return;
    }

    println!("\n=== CODE COUNT RESULTS ===");
    println!("\nTotal unique codes: {}", tally.len());
    println!("Total occurrences: {}", tally.total());

    println!("\nCode counts (sorted by frequency):");
    println!("{}", "-".repeat(40));
    for (code, count) in tally.by_count_desc() {
        println!("  {}: {}", code, count);
    }

    println!("\nAlphabetical listing:");
    println!("{}", "-".repeat(40));
    for (code, count) in tally.iter() {
        println!("  {}: {}", code, count);
    }
}

/// Count trailer codes across a folder
fn cmd_count(folder: PathBuf, verbose: bool) -> Result<()> {
    let tally = tally_folder(&folder, verbose)?;
    print_code_results(&tally);
    Ok(())
}

/// Count trailer codes in one PDF
fn cmd_count_file(input: PathBuf, verbose: bool) -> Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let mut tally = Tally::new();
    tally_document(&input, &mut tally, verbose)?;
    print_code_results(&tally);
    Ok(())
}

/// Dump a PDF's text line by line
fn cmd_lines(input: PathBuf) -> Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let pages = page_texts(&input)?;

    println!("Total pages: {}", pages.len());
    println!("{}", "=".repeat(80));

    for (index, text) in pages.iter().enumerate() {
        println!("\n--- PAGE {} ---", index + 1);

        if text.trim().is_empty() {
            println!("(No text found on this page)");
        } else {
            for (line_num, line) in text.lines().enumerate() {
                println!("Line {}: {}", line_num + 1, line);
            }
        }

        println!("{}", "-".repeat(80));
    }

    Ok(())
}

/// Full pipeline: tally, spreadsheet step, collation
fn cmd_batch(
    folder: PathBuf,
    spreadsheet: Option<PathBuf>,
    create_spreadsheet: bool,
    no_spreadsheet: bool,
    policy: Option<Policy>,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let policy = policy
        .map(SortPolicy::from)
        .unwrap_or_else(|| default_policy(create_spreadsheet));

    eprintln!("STEP 1: Counting trailer codes from all PDFs");
    let tally = tally_folder(&folder, verbose)?;
    print_code_results(&tally);

    let mut step = 2;

    if no_spreadsheet {
        // Skipped by request
    } else if create_spreadsheet {
        let path = folder.join("add to service charges.xlsx");
        eprintln!("\nSTEP {}: Creating spreadsheet {}", step, path.display());
        step += 1;

        if tally.is_empty() {
            eprintln!("No codes to write to the spreadsheet");
        } else {
            sheet::create(&path, &tally, verbose)?;
            eprintln!(
                "Spreadsheet created: {} codes, {} occurrences",
                tally.len(),
                tally.total()
            );
        }
    } else if tally.is_empty() {
        // Nothing to upsert; do not rewrite a workbook for zero changes
        eprintln!("\nNo codes found - skipping spreadsheet update");
    } else {
        match spreadsheet.or_else(|| find_workbook(&folder)) {
            Some(path) => {
                eprintln!("\nSTEP {}: Updating spreadsheet {}", step, path.display());
                step += 1;

                // A bad workbook must not abort the collation step
                match sheet::reconcile(&path, &tally, verbose) {
                    Ok(report) => eprintln!(
                        "Spreadsheet updated: {} updated, {} added",
                        report.updated, report.added
                    ),
                    Err(e) => eprintln!("Error updating spreadsheet: {}", e),
                }
            }
            None => {
                eprintln!("\nNo spreadsheet found or specified - skipping spreadsheet update");
            }
        }
    }

    let output_path = output.unwrap_or_else(|| folder.join(default_output_name(policy)));

    eprintln!("\nSTEP {}: Combining PDFs", step);
    let options = CollateOptions {
        folder,
        output_path: output_path.clone(),
        policy,
        verbose,
    };
    let pages = collate(&options, Some(&tally))?;

    eprintln!("\nCOMPLETE!");
    eprintln!("Total codes counted: {}", tally.total());
    eprintln!("Combined PDF pages: {}", pages);
    eprintln!("Combined PDF output: {}", output_path.display());

    Ok(())
}
