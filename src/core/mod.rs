//! Core data types for allele definitions.
//!
//! - [`DefinitionFile`]: the parsed definition of one gene
//! - [`Variant`]: a defining variant position with its annotations
//! - [`NamedAllele`]: a named haplotype with one allele call per variant
//! - [`GenomeBuild`]: the reference assembly generation of the chromosome
//!
//! ## Variant alignment
//!
//! A table defines `n` variants in column order. Every [`NamedAllele`] carries
//! exactly `n` alleles, where `alleles[i]` is the call at `variants[i]`:
//!
//! | Allele token in table | Normalized |
//! |-----------------------|------------|
//! | `A`, `GT`, `R`        | unchanged  |
//! | `delTC`               | `-`        |
//! | `insGG`               | `GG`       |
//! | (blank)               | (blank)    |

pub mod definition;
pub mod types;

pub use definition::{DefinitionFile, NamedAllele, Variant};
pub use types::{chromosome_name, GenomeBuild};
