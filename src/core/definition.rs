use serde::{Deserialize, Serialize};

use crate::core::types::GenomeBuild;

/// A single defining variant position of a gene.
///
/// Each field holds the cell from one of the per-variant annotation rows of the
/// allele definition table, so all annotation rows stay aligned with `variants`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Free-text resource/nomenclature note
    #[serde(default)]
    pub resource_note: String,

    /// Protein-level description (e.g., "p.I331V")
    #[serde(default)]
    pub protein_note: String,

    /// Chromosomal HGVS position (e.g., "g.94842866A>G")
    pub chromosome_position: String,

    /// Gene-level HGVS position (e.g., "c.-806C>T")
    #[serde(default)]
    pub gene_position: String,

    /// dbSNP identifier, if any
    #[serde(default)]
    pub rsid: String,
}

/// A named haplotype and its allele call at every defining variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedAllele {
    /// Canonical haplotype ID, absent when the name is not mapped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Allele name (e.g., "*2")
    pub name: String,

    /// Allele functional status
    pub function: String,

    /// One normalized allele per variant: bases, "-" for deletions, or blank for no call
    pub alleles: Vec<String>,

    /// Frequencies per population, aligned with `DefinitionFile::populations`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub population_frequencies: Vec<String>,
}

/// The complete definition of a gene's named alleles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionFile {
    pub gene_symbol: String,

    /// `RefSeq` accession of the gene sequence
    pub gene_refseq: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_orientation: Option<String>,

    /// Content date as written in the source table (MM/DD/YY)
    pub version_date: String,

    /// Content version, e.g. the revision of the source file
    #[serde(default)]
    pub version_tag: String,

    pub genome_build: GenomeBuild,

    /// UCSC-style chromosome name (e.g., "chr10")
    pub chromosome_name: String,

    /// `RefSeq` accession of the chromosome
    pub chromosome_refseq: String,

    /// `RefSeq` accession of the protein
    pub protein_refseq: String,

    pub variants: Vec<Variant>,

    /// Population names from the allele frequency columns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub populations: Vec<String>,

    pub named_alleles: Vec<NamedAllele>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl DefinitionFile {
    /// Number of defining variants
    #[must_use]
    pub fn num_variants(&self) -> usize {
        self.variants.len()
    }

    /// Find a named allele by name
    #[must_use]
    pub fn named_allele(&self, name: &str) -> Option<&NamedAllele> {
        self.named_alleles.iter().find(|a| a.name == name)
    }

    /// Check that every named allele has exactly one allele per variant.
    ///
    /// Returns the first allele violating the invariant.
    #[must_use]
    pub fn find_width_mismatch(&self) -> Option<&NamedAllele> {
        let width = self.variants.len();
        self.named_alleles.iter().find(|a| a.alleles.len() != width)
    }
}
