//! # allele-def
//!
//! A library for turning curated allele definition tables into versioned,
//! machine-readable gene definitions.
//!
//! An allele definition table describes, for one gene, the variant positions
//! that define its named alleles (haplotypes) and the allele every named
//! haplotype carries at each position. Tables are written by hand in
//! spreadsheets, so every one is checked before anything is produced: header
//! grammar, genome build of the chromosome accession, column titles, allele
//! tokens and the alignment of every row with the defining variants.
//!
//! ## Features
//!
//! - **Strict parsing**: the first violation aborts the table with its line, column and value
//! - **Genome build policy**: chromosome accessions are resolved through an embedded assembly table
//! - **Haplotype IDs**: optional mapping of allele names to canonical IDs
//! - **Versioned output**: deterministic tab-delimited format, readable back, or JSON
//! - **Spreadsheet input**: `.xls`/`.xlsx` conversion to table text
//!
//! ## Example
//!
//! ```rust,no_run
//! use allele_def::{ParserConfig, TableParser};
//! use allele_def::serializer::write_generated;
//!
//! let parser = TableParser::with_config(ParserConfig::default());
//! let definition = parser
//!     .parse_file(std::path::Path::new("CYP2C19.allele.translation.tsv"))
//!     .unwrap();
//!
//! println!("{}: {} named alleles", definition.gene_symbol, definition.named_alleles.len());
//! print!("{}", write_generated(&definition));
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Assembly map and haplotype ID lookups
//! - [`core`]: The definition model and genome build types
//! - [`parsing`]: Table parser, field grammars and spreadsheet conversion
//! - [`serializer`]: Generated-format and JSON output
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod parsing;
pub mod serializer;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::{AssemblyMap, HaplotypeIdMap, HaplotypeIdResolver};
pub use core::definition::{DefinitionFile, NamedAllele, Variant};
pub use core::types::GenomeBuild;
pub use parsing::error::ParseError;
pub use parsing::table::{ParserConfig, TableParser};
