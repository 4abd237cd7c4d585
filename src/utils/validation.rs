//! Centralized limits and input/output file name checks.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Maximum number of lines accepted in a single table (DOS protection)
pub const MAX_TABLE_LINES: usize = 100_000;

/// Maximum number of variant columns accepted in a single table (DOS protection)
pub const MAX_VARIANTS: usize = 10_000;

pub const MAX_FILENAME_LENGTH: usize = 255;

/// Gene symbol at the start of a spreadsheet file name (e.g., "CYP2C19 translation.xlsx")
static GENE_FILENAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z0-9]+)").expect("valid regex"));

/// Check whether a table defines more variants than allowed
#[must_use]
pub fn exceeds_variant_limit(count: usize) -> bool {
    count > MAX_VARIANTS
}

/// Output name validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Filename too long: exceeds {MAX_FILENAME_LENGTH} characters")]
    FilenameTooLong,
    #[error("Invalid filename: contains path traversal or invalid characters")]
    InvalidFilename,
    #[error("Empty filename provided")]
    EmptyFilename,
}

/// Validate a file name built from table content (e.g., a gene symbol).
///
/// Rejects path separators, traversal and control characters, and strips any
/// character outside `[A-Za-z0-9._-]`.
///
/// # Errors
///
/// Returns `ValidationError::EmptyFilename` if the filename is empty,
/// `ValidationError::FilenameTooLong` if it exceeds the limit, or
/// `ValidationError::InvalidFilename` if it contains invalid characters.
pub fn validate_filename(filename: &str) -> Result<String, ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if filename.len() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::FilenameTooLong);
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ValidationError::InvalidFilename);
    }

    if filename.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidFilename);
    }

    let sanitized = filename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-' || *c == '_')
        .collect::<String>();

    if sanitized.is_empty() || sanitized.starts_with('.') {
        return Err(ValidationError::InvalidFilename);
    }

    Ok(sanitized)
}

/// Extract the gene symbol a spreadsheet file is named after.
///
/// Returns None when the file name does not start with an uppercase
/// alphanumeric token.
#[must_use]
pub fn gene_symbol_from_filename(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    GENE_FILENAME_PATTERN
        .captures(name)
        .map(|caps| caps[1].to_string())
}

/// Check for a spreadsheet file, skipping office lock files ("~$...")
#[must_use]
pub fn is_spreadsheet_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('~') {
        return false;
    }
    let lower = name.to_lowercase();
    lower.ends_with(".xlsx") || lower.ends_with(".xls")
}

/// Check for a tab-delimited table file
#[must_use]
pub fn is_table_file(path: &Path) -> bool {
    has_extension(path, "tsv")
}

/// Check for a generated definition, tab-delimited or JSON
#[must_use]
pub fn is_definition_file(path: &Path) -> bool {
    has_extension(path, "tsv") || has_extension(path, "json")
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}
