//! Spreadsheet reconciliation: upsert tallied code counts into an xlsx
//! workbook, or write a fresh one.
//!
//! Reading goes through calamine and writing through rust_xlsxwriter, so
//! an in-place update is a read-modify-rewrite. Cell values in every
//! sheet are carried through untouched, and formulas are re-emitted from
//! calamine's formula ranges; cell formatting is not round-tripped.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, XlsxError};

use crate::error::{Error, Result};
use crate::tally::Tally;

/// Column A holds codes, column D holds counts (0-based indices).
const CODE_COL: usize = 0;
const COUNT_COL: usize = 3;

/// Row 1 is the header; data starts on row 2 (0-based index 1).
const FIRST_DATA_ROW: usize = 1;

/// Sheet name used when creating a fresh workbook.
const CREATED_SHEET_NAME: &str = "Code Counts";

/// Outcome of a reconcile run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Codes whose count cell was overwritten in place
    pub updated: usize,
    /// Codes appended past the last existing data row
    pub added: usize,
}

/// A cell value as we carry it between calamine and rust_xlsxwriter.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Formula source without the leading `=`, as calamine reports it
    Formula(String),
}

/// Sparse row-major grid of one sheet; `None` is an empty cell.
type Grid = Vec<Vec<Option<Cell>>>;

fn xlsx_err(e: XlsxError) -> Error {
    Error::Sheet(e.to_string())
}

/// Update an existing workbook with the tally.
///
/// The second sheet is the target: codes live in column A starting at the
/// first data row, counts in column D. Existing codes are matched by
/// trimmed cell value and their count cell overwritten in place; unseen
/// codes are appended at the first row past the scanned block. Rows are
/// never reordered or deleted, and no other column is written. Tally
/// entries are processed in ascending code order, so row assignment is
/// deterministic and a second run with the same tally is a no-op on the
/// final cell values.
///
/// Fails with [`Error::MissingSheet`] when the workbook has fewer than
/// two sheets, leaving the file untouched.
pub fn reconcile(path: &Path, tally: &Tally, verbose: bool) -> Result<ReconcileReport> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    // Nothing to upsert; leave the workbook untouched on disk.
    if tally.is_empty() {
        return Ok(ReconcileReport::default());
    }

    let mut sheets = read_sheets(path)?;
    if sheets.len() < 2 {
        return Err(Error::MissingSheet);
    }

    eprintln!("Working with sheet: '{}'", sheets[1].0);
    let grid = &mut sheets[1].1;

    // Scan the code column top to bottom until the first empty cell.
    let mut existing: HashMap<String, usize> = HashMap::new();
    let mut frontier = FIRST_DATA_ROW;
    while let Some(code) = code_at(grid, frontier, CODE_COL) {
        existing.insert(code, frontier);
        frontier += 1;
    }

    if verbose {
        eprintln!("Found {} existing codes in spreadsheet", existing.len());
        eprintln!("Next empty row: {}", frontier + 1);
    }

    let mut report = ReconcileReport::default();

    for (code, count) in tally.iter() {
        if let Some(&row) = existing.get(code) {
            set_cell(grid, row, COUNT_COL, Cell::Number(count as f64));
            report.updated += 1;
            if verbose {
                eprintln!("  Updated '{}' at row {}: {}", code, row + 1, count);
            }
        } else {
            set_cell(grid, frontier, CODE_COL, Cell::Text(code.to_string()));
            set_cell(grid, frontier, COUNT_COL, Cell::Number(count as f64));
            report.added += 1;
            if verbose {
                eprintln!("  Added '{}' at row {}: {}", code, frontier + 1, count);
            }
            frontier += 1;
        }
    }

    write_sheets(path, &sheets)?;

    Ok(report)
}

/// Create a fresh workbook holding the tally.
///
/// One sheet, bold header in A1/D1, then one row per code in ascending
/// code order starting at the first data row.
pub fn create(path: &Path, tally: &Tally, verbose: bool) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(CREATED_SHEET_NAME).map_err(xlsx_err)?;

    let header = Format::new().set_bold().set_align(FormatAlign::Center);
    worksheet
        .write_string_with_format(0, CODE_COL as u16, "Code", &header)
        .map_err(xlsx_err)?;
    worksheet
        .write_string_with_format(0, COUNT_COL as u16, "Count", &header)
        .map_err(xlsx_err)?;
    worksheet.set_column_width(CODE_COL as u16, 15).map_err(xlsx_err)?;
    worksheet.set_column_width(COUNT_COL as u16, 12).map_err(xlsx_err)?;

    for (rank, (code, count)) in tally.iter().enumerate() {
        let row = (FIRST_DATA_ROW + rank) as u32;
        worksheet
            .write_string(row, CODE_COL as u16, code)
            .map_err(xlsx_err)?;
        worksheet
            .write_number(row, COUNT_COL as u16, count as f64)
            .map_err(xlsx_err)?;
        if verbose {
            eprintln!("  Row {}: {} = {}", row + 1, code, count);
        }
    }

    workbook
        .save(path)
        .map_err(|e| Error::Sheet(format!("failed to save {}: {}", path.display(), e)))?;

    Ok(())
}

/// Read every sheet of a workbook into value grids, preserving sheet
/// order and names.
fn read_sheets(path: &Path) -> Result<Vec<(String, Grid)>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| Error::Sheet(format!("failed to open {}: {}", path.display(), e)))?;

    let names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());

    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| Error::Sheet(format!("failed to read sheet '{}': {}", name, e)))?;

        // calamine ranges start at the first used cell, not at A1.
        let start = range.start().unwrap_or((0, 0));
        let (start_row, start_col) = (start.0 as usize, start.1 as usize);
        let (height, width) = range.get_size();

        let mut grid: Grid = vec![vec![None; start_col + width]; start_row + height];
        for (r, row) in range.rows().enumerate() {
            for (c, value) in row.iter().enumerate() {
                grid[start_row + r][start_col + c] = convert(value);
            }
        }

        // Formula cells are carried as formulas, not as their cached
        // values, so rewriting the workbook keeps them live.
        let formulas = workbook
            .worksheet_formula(&name)
            .map_err(|e| Error::Sheet(format!("failed to read formulas of '{}': {}", name, e)))?;
        let fstart = formulas.start().unwrap_or((0, 0));
        for (r, row) in formulas.rows().enumerate() {
            for (c, formula) in row.iter().enumerate() {
                if !formula.is_empty() {
                    set_cell(
                        &mut grid,
                        fstart.0 as usize + r,
                        fstart.1 as usize + c,
                        Cell::Formula(formula.clone()),
                    );
                }
            }
        }

        sheets.push((name, grid));
    }

    Ok(sheets)
}

/// Rewrite the workbook from the value grids.
fn write_sheets(path: &Path, sheets: &[(String, Grid)]) -> Result<()> {
    let mut workbook = Workbook::new();

    for (name, grid) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name).map_err(xlsx_err)?;

        for (r, row) in grid.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (row_num, col_num) = (r as u32, c as u16);
                match cell {
                    Some(Cell::Text(s)) => {
                        worksheet.write_string(row_num, col_num, s).map_err(xlsx_err)?;
                    }
                    Some(Cell::Number(n)) => {
                        worksheet.write_number(row_num, col_num, *n).map_err(xlsx_err)?;
                    }
                    Some(Cell::Bool(b)) => {
                        worksheet.write_boolean(row_num, col_num, *b).map_err(xlsx_err)?;
                    }
                    Some(Cell::Formula(f)) => {
                        worksheet
                            .write_formula(row_num, col_num, f.as_str())
                            .map_err(xlsx_err)?;
                    }
                    None => {}
                }
            }
        }
    }

    workbook
        .save(path)
        .map_err(|e| Error::Sheet(format!("failed to save {}: {}", path.display(), e)))?;

    Ok(())
}

fn convert(value: &Data) -> Option<Cell> {
    match value {
        Data::Empty => None,
        Data::String(s) => Some(Cell::Text(s.clone())),
        Data::Int(i) => Some(Cell::Number(*i as f64)),
        Data::Float(f) => Some(Cell::Number(*f)),
        Data::Bool(b) => Some(Cell::Bool(*b)),
        Data::DateTime(dt) => Some(Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) => Some(Cell::Text(s.clone())),
        Data::DurationIso(s) => Some(Cell::Text(s.clone())),
        // Error cells have no value representation we can carry over
        Data::Error(_) => None,
    }
}

/// Trimmed code string at a cell, or `None` for an empty/blank cell.
/// Numeric cells stringify the way a code typed as a number reads.
fn code_at(grid: &Grid, row: usize, col: usize) -> Option<String> {
    match grid.get(row)?.get(col)?.as_ref()? {
        Cell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Cell::Number(n) => Some(format_number(*n)),
        // A formula or bool in the code column is not a code; the scan
        // stops there like it would on an empty cell
        Cell::Bool(_) | Cell::Formula(_) => None,
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Write a cell, growing the grid as needed.
fn set_cell(grid: &mut Grid, row: usize, col: usize, cell: Cell) {
    if grid.len() <= row {
        grid.resize(row + 1, Vec::new());
    }
    let r = &mut grid[row];
    if r.len() <= col {
        r.resize(col + 1, None);
    }
    r[col] = Some(cell);
}
