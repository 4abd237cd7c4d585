//! Parsing of allele definition tables and their spreadsheet sources.
//!
//! - [`table`]: the table parser, a line-driven state machine producing a
//!   [`DefinitionFile`](crate::core::definition::DefinitionFile)
//! - [`grammar`]: single-cell grammars (gene field, dates, `RefSeq`
//!   accessions, HGVS positions, allele tokens, population titles)
//! - [`excel`]: first-worksheet conversion of `.xls`/`.xlsx` to table text
//! - [`error`]: the shared [`ParseError`]

pub mod error;
pub mod excel;
pub mod grammar;
pub mod table;

pub use error::{ErrorKind, FieldRole, ParseError};
pub use excel::{convert_to_tsv, ConvertError};
pub use table::{ParserConfig, TableParser};
