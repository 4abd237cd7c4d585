//! Lookup from `RefSeq` chromosome accession to genome build.
//!
//! The table is embedded at compile time from `data/assembly_map.tsv`
//! (validated by `build.rs`) and covers chromosomes 1-22, X and Y for
//! `GRCh37` and `GRCh38`.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;

use crate::catalog::CatalogError;
use crate::core::types::GenomeBuild;

const EMBEDDED_TABLE: &str = include_str!("../../data/assembly_map.tsv");

static EMBEDDED: Lazy<AssemblyMap> = Lazy::new(|| {
    // build.rs rejects malformed rows, so nothing is dropped here
    AssemblyMap::from_entries(parse_rows(EMBEDDED_TABLE).filter_map(Result::ok))
});

/// One row of an assembly table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyEntry {
    /// `RefSeq` accession including version (e.g., "`NC_000010.11`")
    pub accession: String,
    pub build: GenomeBuild,
    /// UCSC-style chromosome name
    pub chromosome: String,
}

/// Read-only accession -> build lookup
#[derive(Debug, Clone, Default)]
pub struct AssemblyMap {
    entries: HashMap<String, AssemblyEntry>,
}

impl AssemblyMap {
    /// The embedded human assembly table
    #[must_use]
    pub fn embedded() -> &'static AssemblyMap {
        &EMBEDDED
    }

    pub fn from_entries(entries: impl IntoIterator<Item = AssemblyEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| (e.accession.clone(), e))
            .collect();
        Self { entries }
    }

    /// Load an assembly table from a TSV file with columns: accession, build, chromosome
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, or
    /// `CatalogError::InvalidAssemblyRow` for a malformed row.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_tsv(&content)
    }

    /// Parse an assembly table, failing on the first malformed row
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidAssemblyRow` for a malformed row.
    pub fn from_tsv(text: &str) -> Result<Self, CatalogError> {
        let entries = parse_rows(text).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_entries(entries))
    }

    /// Resolve an accession to its genome build
    #[must_use]
    pub fn resolve(&self, accession: &str) -> Option<GenomeBuild> {
        self.entries.get(accession).map(|e| e.build)
    }

    /// Full entry for an accession
    #[must_use]
    pub fn get(&self, accession: &str) -> Option<&AssemblyEntry> {
        self.entries.get(accession)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_rows(text: &str) -> impl Iterator<Item = Result<AssemblyEntry, CatalogError>> + '_ {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|(i, line)| {
            let line_num = i + 1;
            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            if fields.len() != 3 {
                return Err(CatalogError::InvalidAssemblyRow {
                    line: line_num,
                    message: format!("expected 3 columns, found {}", fields.len()),
                });
            }
            let build = GenomeBuild::parse(fields[1]).ok_or_else(|| {
                CatalogError::InvalidAssemblyRow {
                    line: line_num,
                    message: format!("unknown genome build '{}'", fields[1]),
                }
            })?;
            Ok(AssemblyEntry {
                accession: fields[0].to_string(),
                build,
                chromosome: fields[2].to_string(),
            })
        })
}
