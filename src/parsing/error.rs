use thiserror::Error;

use crate::core::types::GenomeBuild;
use crate::utils::validation::{MAX_TABLE_LINES, MAX_VARIANTS};

/// The field a validation failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    GeneSymbol,
    VersionDate,
    NamingLine,
    ProteinRefSeq,
    ChromosomeRefSeq,
    GenomeBuild,
    GeneRefSeq,
    ChromosomePosition,
    AlleleName,
    PopulationTitle,
    MetadataValue,
}

impl std::fmt::Display for FieldRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::GeneSymbol => "gene field",
            Self::VersionDate => "version date",
            Self::NamingLine => "naming line label",
            Self::ProteinRefSeq => "protein RefSeq",
            Self::ChromosomeRefSeq => "chromosome RefSeq",
            Self::GenomeBuild => "genome build",
            Self::GeneRefSeq => "gene RefSeq",
            Self::ChromosomePosition => "chromosomal position",
            Self::AlleleName => "allele name",
            Self::PopulationTitle => "population title",
            Self::MetadataValue => "metadata value",
        };
        write!(f, "{name}")
    }
}

/// Broad classification of a [`ParseError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing lines or blocks
    Structural,
    /// A single field fails its grammar
    FieldFormat,
    /// Fields that are individually valid disagree with each other
    CrossFieldInvariant,
    /// A required lookup (genome build) found nothing
    LookupMiss,
    Io,
}

/// Errors raised while reading an allele definition table or a generated definition.
///
/// Line and column numbers are 1-based.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not enough lines in table: expected at least {expected}, found {found}")]
    TooShort { expected: usize, found: usize },

    #[error("Line {line}: {message}")]
    Structural { line: usize, message: String },

    #[error("Line {line}, column {column}: invalid {role} '{value}'")]
    FieldFormat {
        line: usize,
        column: usize,
        role: FieldRole,
        value: String,
    },

    #[error("Line {line}: invalid allele tokens for '{allele}': {}", .tokens.join(", "))]
    InvalidAlleleTokens {
        line: usize,
        allele: String,
        tokens: Vec<String>,
    },

    #[error("Line {line}, column {column}: expected column title '{expected}', found '{found}'")]
    ColumnTitleMismatch {
        line: usize,
        column: usize,
        expected: String,
        found: String,
    },

    #[error("Line {line}: {what} has {found} columns but {expected} variants are defined")]
    VariantCountMismatch {
        line: usize,
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: unknown chromosome accession '{accession}'")]
    UnknownAccession { line: usize, accession: String },

    #[error("Line {line}: genome build {build} is not permitted (allowed: {})", format_builds(.permitted))]
    BuildNotPermitted {
        line: usize,
        build: GenomeBuild,
        permitted: Vec<GenomeBuild>,
    },

    #[error("Line {line}: accession '{accession}' belongs to {resolved} but the line names {named}")]
    BuildMismatch {
        line: usize,
        accession: String,
        resolved: GenomeBuild,
        named: String,
    },

    #[error("Line {line}: unknown or unsupported chromosome number {number}")]
    ChromosomeOutOfRange { line: usize, number: u32 },

    #[error("Too many lines: {0} exceeds maximum allowed ({MAX_TABLE_LINES})")]
    TooManyLines(usize),

    #[error("Too many variants: {0} exceeds maximum allowed ({MAX_VARIANTS})")]
    TooManyVariants(usize),
}

fn format_builds(builds: &[GenomeBuild]) -> String {
    builds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ParseError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::TooShort { .. }
            | Self::Structural { .. }
            | Self::TooManyLines(_)
            | Self::TooManyVariants(_) => ErrorKind::Structural,
            Self::FieldFormat { .. }
            | Self::InvalidAlleleTokens { .. }
            | Self::ColumnTitleMismatch { .. } => ErrorKind::FieldFormat,
            Self::VariantCountMismatch { .. }
            | Self::BuildNotPermitted { .. }
            | Self::BuildMismatch { .. }
            | Self::ChromosomeOutOfRange { .. } => ErrorKind::CrossFieldInvariant,
            Self::UnknownAccession { .. } => ErrorKind::LookupMiss,
        }
    }

    /// Source line of the error, if it refers to one
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Structural { line, .. }
            | Self::FieldFormat { line, .. }
            | Self::InvalidAlleleTokens { line, .. }
            | Self::ColumnTitleMismatch { line, .. }
            | Self::VariantCountMismatch { line, .. }
            | Self::UnknownAccession { line, .. }
            | Self::BuildNotPermitted { line, .. }
            | Self::BuildMismatch { line, .. }
            | Self::ChromosomeOutOfRange { line, .. } => Some(*line),
            Self::Io(_)
            | Self::TooShort { .. }
            | Self::TooManyLines(_)
            | Self::TooManyVariants(_) => None,
        }
    }
}
