//! Resolution of haplotype names to canonical haplotype IDs.
//!
//! IDs come from an external reference source and are loaded from a JSON
//! document mapping gene symbol to allele name to ID:
//!
//! ```json
//! {
//!   "CYP2C19": { "*1": "PA165980634", "*2": "PA165980635" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::catalog::CatalogError;

/// Lookup of canonical haplotype IDs.
///
/// A missing ID is not an error; callers keep the allele without an ID.
pub trait HaplotypeIdResolver: Send + Sync {
    fn resolve(&self, gene: &str, allele_name: &str) -> Option<&str>;
}

/// Resolver that never finds an ID
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaplotypeIds;

impl HaplotypeIdResolver for NoHaplotypeIds {
    fn resolve(&self, _gene: &str, _allele_name: &str) -> Option<&str> {
        None
    }
}

/// Per-gene map of allele name -> haplotype ID
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HaplotypeIdMap {
    genes: BTreeMap<String, BTreeMap<String, String>>,
}

impl HaplotypeIdMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a haplotype ID map from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read or
    /// `CatalogError::Json` if it is not a valid map.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a haplotype ID map from JSON
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Json` if the text is not a valid map.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Register the ID of one allele
    pub fn insert(
        &mut self,
        gene: impl Into<String>,
        allele_name: impl Into<String>,
        id: impl Into<String>,
    ) {
        self.genes
            .entry(gene.into())
            .or_default()
            .insert(allele_name.into(), id.into());
    }

    /// All allele IDs of a gene
    #[must_use]
    pub fn gene(&self, gene: &str) -> Option<&BTreeMap<String, String>> {
        self.genes.get(gene)
    }

    /// Number of genes with at least one ID
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl HaplotypeIdResolver for HaplotypeIdMap {
    fn resolve(&self, gene: &str, allele_name: &str) -> Option<&str> {
        self.genes
            .get(gene)
            .and_then(|alleles| alleles.get(allele_name))
            .map(String::as_str)
    }
}
