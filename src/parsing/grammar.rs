//! Field grammars for allele definition tables.
//!
//! Every grammar validates a single cell and returns either the captured
//! parts or a [`GrammarError`] carrying the offending text, so callers can
//! attach line/column context or collect several failures at once.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static GENE_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^GENE:\s*([A-Za-z0-9_]+)$").expect("valid regex"));
static REFSEQ: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(N[A-Z]_([0-9]+)\.[0-9]+)").expect("valid regex"));
static GENOME_BUILD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(GRCh[0-9]+(?:\.p[0-9]+)?)").expect("valid regex"));
static POSITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[cgp]\.[0-9]+.*$").expect("valid regex"));
static ALLELE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:del[ACGT]*|ins[ACGT]+|[ACGTURYSWKMBDHVN]*)$").expect("valid regex")
});

/// Date format of the version date on the gene line
pub const VERSION_DATE_FORMAT: &str = "%m/%d/%y";

/// Suffix every population column title ends with
pub const POPULATION_TITLE_SUFFIX: &str = " Allele Frequency";

/// A cell that does not match its grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError {
    /// The offending text (the whole cell, or the single bad token)
    pub value: String,
}

impl GrammarError {
    fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// A `RefSeq` accession found in free text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefSeq<'a> {
    /// Full accession with version (e.g., "`NC_000010.11`")
    pub accession: &'a str,
    /// Numeric part of the accession (10 for "`NC_000010.11`"), saturating on overflow
    pub number: u32,
}

/// Match a gene header cell (`GENE: CYP2C19`) and return the gene symbol
///
/// # Errors
///
/// Returns the cell text if it is not a gene field.
pub fn parse_gene_field(text: &str) -> Result<&str, GrammarError> {
    let text = text.trim();
    GENE_FIELD
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| GrammarError::new(text))
}

/// Parse the content date (`MM/DD/YY`)
///
/// # Errors
///
/// Returns the cell text if it is not a valid date.
pub fn parse_version_date(text: &str) -> Result<NaiveDate, GrammarError> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, VERSION_DATE_FORMAT).map_err(|_| GrammarError::new(text))
}

/// Find the `RefSeq` accession embedded in a description cell
///
/// # Errors
///
/// Returns the cell text if it contains no accession.
pub fn find_refseq(text: &str) -> Result<RefSeq<'_>, GrammarError> {
    let caps = REFSEQ
        .captures(text)
        .ok_or_else(|| GrammarError::new(text.trim()))?;
    let (Some(accession), Some(digits)) = (caps.get(1), caps.get(2)) else {
        return Err(GrammarError::new(text.trim()));
    };
    let number = digits.as_str().parse::<u32>().unwrap_or(u32::MAX);
    Ok(RefSeq {
        accession: accession.as_str(),
        number,
    })
}

/// Find the genome build token (`GRCh38`, `GRCh38.p7`) in a description cell
///
/// # Errors
///
/// Returns the cell text if it names no build.
pub fn find_genome_build(text: &str) -> Result<&str, GrammarError> {
    GENOME_BUILD
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| GrammarError::new(text.trim()))
}

/// Split position text on `;` and validate every HGVS-style token.
///
/// # Errors
///
/// Returns the first token that is not `c.`, `g.` or `p.` followed by a number.
/// Blank text is reported as an empty token.
pub fn parse_positions(text: &str) -> Result<Vec<&str>, GrammarError> {
    if text.trim().is_empty() {
        return Err(GrammarError::new(""));
    }
    text.split(';')
        .map(str::trim)
        .map(|token| {
            if POSITION.is_match(token) {
                Ok(token)
            } else {
                Err(GrammarError::new(token))
            }
        })
        .collect()
}

/// Check a single base-pair/indel allele token
#[must_use]
pub fn is_valid_allele_token(token: &str) -> bool {
    ALLELE_TOKEN.is_match(token)
}

/// Check every allele token of a row and report all invalid ones.
///
/// # Errors
///
/// Returns every invalid token, in column order.
pub fn validate_allele_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<(), Vec<String>> {
    let bad: Vec<String> = tokens
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|t| !is_valid_allele_token(t))
        .map(str::to_string)
        .collect();
    if bad.is_empty() {
        Ok(())
    } else {
        Err(bad)
    }
}

/// Normalize a valid allele token: deletions become `-`, insertions lose their `ins` prefix
#[must_use]
pub fn normalize_allele_token(token: &str) -> String {
    if let Some(inserted) = token.strip_prefix("ins") {
        inserted.to_string()
    } else if token.starts_with("del") {
        "-".to_string()
    } else {
        token.to_string()
    }
}

/// Validate a population column title and return the population name
///
/// # Errors
///
/// Returns the title if it does not end with " Allele Frequency".
pub fn parse_population_title(title: &str) -> Result<&str, GrammarError> {
    let title = title.trim();
    title
        .strip_suffix(POPULATION_TITLE_SUFFIX)
        .map(str::trim)
        .ok_or_else(|| GrammarError::new(title))
}
