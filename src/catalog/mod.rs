//! Read-only lookup tables consulted while parsing.
//!
//! - [`AssemblyMap`]: `RefSeq` chromosome accession to genome build
//! - [`HaplotypeIdResolver`]: gene + allele name to canonical haplotype ID
//!
//! Both are immutable once loaded, so a single instance can be shared by
//! every table parsed in parallel.

use thiserror::Error;

pub mod assembly;
pub mod haplotype;

pub use assembly::AssemblyMap;
pub use haplotype::{HaplotypeIdMap, HaplotypeIdResolver, NoHaplotypeIds};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid assembly table row {line}: {message}")]
    InvalidAssemblyRow { line: usize, message: String },
}
