//! Convert allele definition spreadsheets into tab-delimited tables.
//!
//! Only the first worksheet is read. Cells are rendered as text the table
//! parser understands: numbers in plain decimal notation, booleans as
//! `true`/`false`, dates as `MM/DD/YY`. Empty rows are dropped and three
//! empty rows in a row end the sheet.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, info};

use crate::parsing::grammar::VERSION_DATE_FORMAT;
use crate::utils::output::write_atomically;
use crate::utils::validation::{
    gene_symbol_from_filename, validate_filename, ValidationError, MAX_TABLE_LINES,
};

/// Consecutive empty rows that end a worksheet
pub const MAX_EMPTY_ROWS: usize = 3;

/// Suffix of every converted table file name
pub const TRANSLATION_SUFFIX: &str = ".allele.translation.tsv";

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Failed to open workbook {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("Workbook {} has no worksheets", .0.display())]
    NoWorksheet(PathBuf),

    #[error("Cell {cell} contains an error value ({error})")]
    CellError { cell: String, error: String },

    #[error("Cannot determine gene symbol from file name {}", .0.display())]
    NoGeneSymbol(PathBuf),

    #[error("Invalid output name: {0}")]
    InvalidName(#[from] ValidationError),

    #[error("Too many rows: exceeds maximum allowed ({MAX_TABLE_LINES})")]
    TooManyRows,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read the first worksheet of an `.xls` or `.xlsx` workbook
///
/// # Errors
///
/// Returns `ConvertError::Open` if the workbook cannot be read, or
/// `ConvertError::NoWorksheet` if it has no sheets.
pub fn read_first_sheet(path: &Path) -> Result<Range<Data>, ConvertError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| ConvertError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ConvertError::NoWorksheet(path.to_path_buf()))?
        .map_err(|source| ConvertError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Render a worksheet as tab-delimited lines
///
/// # Errors
///
/// Returns `ConvertError::CellError` for the first error-valued cell, or
/// `ConvertError::TooManyRows` when the sheet exceeds the table line limit.
pub fn sheet_to_lines(range: &Range<Data>) -> Result<Vec<String>, ConvertError> {
    let (first_row, first_col) = range
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));

    let mut lines = Vec::new();
    let mut width = None;
    let mut empty_rows = 0;

    for (r, row) in range.rows().enumerate() {
        let mut cells = vec![String::new(); first_col];
        for (c, cell) in row.iter().enumerate() {
            cells.push(format_cell(cell, first_row + r, first_col + c)?);
        }
        while cells.last().is_some_and(String::is_empty) {
            cells.pop();
        }

        if cells.is_empty() {
            empty_rows += 1;
            if empty_rows >= MAX_EMPTY_ROWS {
                debug!("{MAX_EMPTY_ROWS} empty rows at row {}, ending sheet", first_row + r + 1);
                break;
            }
            continue;
        }
        empty_rows = 0;

        if lines.len() >= MAX_TABLE_LINES {
            return Err(ConvertError::TooManyRows);
        }
        let row_width = *width.get_or_insert(cells.len());
        if cells.len() < row_width {
            cells.resize(row_width, String::new());
        }
        lines.push(cells.join("\t"));
    }

    Ok(lines)
}

/// Render a single cell; `row` and `col` are 0-based sheet coordinates
///
/// # Errors
///
/// Returns `ConvertError::CellError` for error values such as `#N/A`.
pub fn format_cell(cell: &Data, row: usize, col: usize) -> Result<String, ConvertError> {
    let text = match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or_else(|| dt.as_f64().to_string(), |d| format_date(&d)),
        Data::DateTimeIso(s) => {
            parse_iso_datetime(s).map_or_else(|| s.clone(), |d| format_date(&d))
        }
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => {
            return Err(ConvertError::CellError {
                cell: cell_address(row, col),
                error: e.to_string(),
            })
        }
    };
    Ok(text)
}

fn format_date(datetime: &NaiveDateTime) -> String {
    datetime.format(VERSION_DATE_FORMAT).to_string()
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Spreadsheet address of a 0-based cell (e.g., (0, 27) is "AB1")
#[must_use]
pub fn cell_address(row: usize, col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    let column: String = letters.iter().rev().collect();
    format!("{column}{}", row + 1)
}

/// Output name for a spreadsheet
///
/// `CYP2C19 translation.xlsx` becomes `CYP2C19.allele.translation.tsv`.
///
/// # Errors
///
/// Returns `ConvertError::NoGeneSymbol` if the file name does not start with a gene symbol.
pub fn translation_file_name(path: &Path) -> Result<String, ConvertError> {
    let gene = gene_symbol_from_filename(path)
        .ok_or_else(|| ConvertError::NoGeneSymbol(path.to_path_buf()))?;
    Ok(validate_filename(&format!("{gene}{TRANSLATION_SUFFIX}"))?)
}

/// Convert a workbook into a table file in `out_dir`, returning the path written.
///
/// # Errors
///
/// Returns `ConvertError` if the workbook cannot be read or rendered, or the
/// output cannot be written. Nothing is written on error.
pub fn convert_to_tsv(path: &Path, out_dir: &Path) -> Result<PathBuf, ConvertError> {
    let name = translation_file_name(path)?;
    let range = read_first_sheet(path)?;
    let lines = sheet_to_lines(&range)?;

    let mut contents = lines.join("\n");
    contents.push('\n');

    let out = out_dir.join(name);
    write_atomically(&out, contents.as_bytes())?;
    info!("Converted {} to {} ({} rows)", path.display(), out.display(), lines.len());
    Ok(out)
}
