//! Output of validated definitions.
//!
//! Definitions are written either in the versioned tab-delimited format
//! ([`generated`]) or as pretty-printed JSON. Files are only written for a
//! fully validated definition and always through a temporary file, so a
//! failing gene never leaves a partial or truncated output behind.

pub mod generated;

pub use generated::{read_generated, write_generated, FORMAT_VERSION};

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use thiserror::Error;
use tracing::debug;

use crate::core::definition::DefinitionFile;
use crate::parsing::error::ParseError;
use crate::utils::output::write_atomically;
use crate::utils::validation::{validate_filename, ValidationError};

/// Suffix of every definition file name, before the format extension
pub const DEFINITION_SUFFIX: &str = ".allele.definition";

/// Format of a written definition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DefinitionFormat {
    #[default]
    Tsv,
    Json,
}

impl DefinitionFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Tsv => "tsv",
            Self::Json => "json",
        }
    }
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid output name: {0}")]
    InvalidName(#[from] ValidationError),

    #[error("Allele '{allele}' has {found} alleles but {expected} variants are defined")]
    WidthMismatch {
        allele: String,
        expected: usize,
        found: usize,
    },
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Definition has no gene symbol")]
    MissingGeneSymbol,

    #[error("Definition for {0} has no named alleles")]
    NoNamedAlleles(String),

    #[error("Allele '{allele}' has {found} alleles but {expected} variants are defined")]
    WidthMismatch {
        allele: String,
        expected: usize,
        found: usize,
    },
}

/// Render a definition in the requested format
///
/// # Errors
///
/// Returns `WriteError::WidthMismatch` if a named allele is not aligned with
/// the variants, or a JSON error.
pub fn render(definition: &DefinitionFile, format: DefinitionFormat) -> Result<String, WriteError> {
    if let Some(allele) = definition.find_width_mismatch() {
        return Err(WriteError::WidthMismatch {
            allele: allele.name.clone(),
            expected: definition.num_variants(),
            found: allele.alleles.len(),
        });
    }

    match format {
        DefinitionFormat::Tsv => Ok(write_generated(definition)),
        DefinitionFormat::Json => {
            let mut json = serde_json::to_string_pretty(definition)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// File name for a gene's definition (e.g., `CYP2C19.allele.definition.tsv`)
///
/// # Errors
///
/// Returns a `ValidationError` if the gene symbol does not make a safe file name.
pub fn definition_file_name(
    gene: &str,
    format: DefinitionFormat,
) -> Result<String, ValidationError> {
    validate_filename(&format!(
        "{gene}{DEFINITION_SUFFIX}.{}",
        format.extension()
    ))
}

/// Write a definition into `dir`, returning the path written.
///
/// # Errors
///
/// Returns `WriteError` if rendering fails, the gene symbol does not make a
/// safe file name, or the file cannot be written. Nothing is written on error.
pub fn write_definition_file(
    dir: &Path,
    definition: &DefinitionFile,
    format: DefinitionFormat,
) -> Result<PathBuf, WriteError> {
    let contents = render(definition, format)?;
    let path = dir.join(definition_file_name(&definition.gene_symbol, format)?);
    write_atomically(&path, contents.as_bytes())?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

/// Read a generated definition back, choosing the reader from the file
/// extension (`.json`, otherwise the tab-delimited format).
///
/// # Errors
///
/// Returns `ReadError` if the file cannot be read or parsed, has no gene
/// symbol or named alleles, or an allele is not aligned with the variants.
pub fn read_definition_file(path: &Path) -> Result<DefinitionFile, ReadError> {
    let text = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DefinitionFormat::Json.extension()));
    let definition = if is_json {
        serde_json::from_str(&text)?
    } else {
        read_generated(&text)?
    };

    check_definition(&definition)?;
    debug!("Read {} from {}", definition.gene_symbol, path.display());
    Ok(definition)
}

fn check_definition(definition: &DefinitionFile) -> Result<(), ReadError> {
    if definition.gene_symbol.is_empty() {
        return Err(ReadError::MissingGeneSymbol);
    }
    if definition.named_alleles.is_empty() {
        return Err(ReadError::NoNamedAlleles(definition.gene_symbol.clone()));
    }
    if let Some(allele) = definition.find_width_mismatch() {
        return Err(ReadError::WidthMismatch {
            allele: allele.name.clone(),
            expected: definition.num_variants(),
            found: allele.alleles.len(),
        });
    }
    Ok(())
}
