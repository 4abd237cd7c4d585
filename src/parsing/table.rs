//! Parser for curated allele definition tables.
//!
//! A table is tab-delimited text with a fixed header block, an allele block
//! and an optional notes block:
//!
//! | Line | Role | Columns |
//! |------|------|---------|
//! | 1 | gene | `GENE: <symbol>`, content date `MM/DD/YY` |
//! | 2 | naming | blank, label, one resource note per variant |
//! | 3 | protein | blank, description with protein `RefSeq`, one protein note per variant |
//! | 4 | chromosome | blank, description with chromosome `RefSeq` and `GRCh` build, one HGVS position per variant |
//! | 5 | gene sequence | blank, description with gene `RefSeq`, one gene position per variant |
//! | 6 | rsID | blank, label, one rsID per variant |
//! | 7 | allele header | `Allele`, `Allele Functional Status`, variant columns, `<population> Allele Frequency`... |
//! | 8.. | named alleles | name, function, one allele per variant, one frequency per population |
//! | | notes | a `Notes:` line, then free text |
//!
//! The chromosome line is read first: its last non-blank column fixes the
//! number of variants every other row is aligned to.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use crate::catalog::{AssemblyMap, HaplotypeIdResolver, NoHaplotypeIds};
use crate::core::definition::{DefinitionFile, NamedAllele, Variant};
use crate::core::types::{chromosome_name, GenomeBuild};
use crate::parsing::error::{FieldRole, ParseError};
use crate::parsing::grammar::{self, GrammarError};
use crate::utils::validation::{exceeds_variant_limit, MAX_TABLE_LINES};

/// Minimum number of lines in a table (header block plus the allele header)
pub const MIN_LINE_COUNT: usize = 7;

const SEPARATOR: char = '\t';

const LINE_GENE: usize = 0;
const LINE_NAMING: usize = 1;
const LINE_PROTEIN: usize = 2;
const LINE_CHROMO: usize = 3;
const LINE_GENESEQ: usize = 4;
const LINE_RSID: usize = 5;
const HEADER_LINE_COUNT: usize = 6;

/// Index of the first per-variant column
const FIRST_VARIANT_COLUMN: usize = 2;

pub const ALLELE_COLUMN_TITLE: &str = "Allele";
pub const FUNCTION_COLUMN_TITLE: &str = "Allele Functional Status";
const NOTES_MARKER: &str = "notes:";

/// Settings that decide which tables are acceptable
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Genome builds a chromosome accession may resolve to
    pub permitted_builds: Vec<GenomeBuild>,
    /// Content version recorded in every parsed definition
    pub version_tag: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            permitted_builds: vec![GenomeBuild::B38],
            version_tag: String::new(),
        }
    }
}

impl ParserConfig {
    #[must_use]
    pub fn with_permitted_builds(mut self, builds: impl IntoIterator<Item = GenomeBuild>) -> Self {
        self.permitted_builds = builds.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_version_tag(mut self, tag: impl Into<String>) -> Self {
        self.version_tag = tag.into();
        self
    }
}

/// Where the parser is within the body of a table, once the fixed header
/// lines have been read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for the `Allele` column-title row
    ExpectAlleleHeader,
    ExpectAlleleRows,
    ExpectNotes,
}

/// Per-table state, private to a single parse
#[derive(Debug)]
struct ParseContext {
    state: ParseState,
    num_variants: usize,
    gene_symbol: String,
    version_date: String,
    gene_refseq: String,
    protein_refseq: String,
    chromosome_refseq: String,
    chromosome_name: String,
    genome_build: GenomeBuild,
    variants: Vec<Variant>,
    /// (column index, population name)
    population_columns: Vec<(usize, String)>,
    /// Last column an allele row may use
    last_column: usize,
    allele_header_line: Option<usize>,
    named_alleles: Vec<NamedAllele>,
    allele_names: HashSet<String>,
    notes: Vec<String>,
}

impl ParseContext {
    fn new() -> Self {
        Self {
            state: ParseState::ExpectAlleleHeader,
            num_variants: 0,
            gene_symbol: String::new(),
            version_date: String::new(),
            gene_refseq: String::new(),
            protein_refseq: String::new(),
            chromosome_refseq: String::new(),
            chromosome_name: String::new(),
            genome_build: GenomeBuild::B38,
            variants: Vec::new(),
            population_columns: Vec::new(),
            last_column: 0,
            allele_header_line: None,
            named_alleles: Vec::new(),
            allele_names: HashSet::new(),
            notes: Vec::new(),
        }
    }

    fn finish(self, line_count: usize, version_tag: &str) -> Result<DefinitionFile, ParseError> {
        if self.allele_header_line.is_none() {
            return Err(ParseError::Structural {
                line: line_count,
                message: format!("No allele header row ('{ALLELE_COLUMN_TITLE}') found"),
            });
        }
        if self.named_alleles.is_empty() {
            return Err(ParseError::Structural {
                line: line_count,
                message: "No named alleles defined".to_string(),
            });
        }

        Ok(DefinitionFile {
            gene_symbol: self.gene_symbol,
            gene_refseq: self.gene_refseq,
            gene_orientation: None,
            version_date: self.version_date,
            version_tag: version_tag.to_string(),
            genome_build: self.genome_build,
            chromosome_name: self.chromosome_name,
            chromosome_refseq: self.chromosome_refseq,
            protein_refseq: self.protein_refseq,
            variants: self.variants,
            populations: self
                .population_columns
                .into_iter()
                .map(|(_, name)| name)
                .collect(),
            named_alleles: self.named_alleles,
            notes: self.notes,
        })
    }
}

/// Parses allele definition tables into [`DefinitionFile`]s.
///
/// The parser itself is immutable; every call to [`TableParser::parse_text`]
/// works on its own context, so one parser can be shared across threads.
pub struct TableParser<'a> {
    config: ParserConfig,
    assemblies: &'a AssemblyMap,
    haplotype_ids: &'a dyn HaplotypeIdResolver,
}

impl TableParser<'static> {
    /// Parser using the embedded assembly table and no haplotype IDs
    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        Self::new(config, AssemblyMap::embedded(), &NoHaplotypeIds)
    }
}

impl<'a> TableParser<'a> {
    pub fn new(
        config: ParserConfig,
        assemblies: &'a AssemblyMap,
        haplotype_ids: &'a dyn HaplotypeIdResolver,
    ) -> Self {
        Self {
            config,
            assemblies,
            haplotype_ids,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a table file
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read, or the first
    /// validation failure in the table.
    pub fn parse_file(&self, path: &Path) -> Result<DefinitionFile, ParseError> {
        let content = std::fs::read_to_string(path)?;
        self.parse_text(&content)
    }

    /// Parse table text
    ///
    /// # Errors
    ///
    /// Returns the first structural, field, cross-field or lookup failure.
    /// No partial definition is ever returned.
    pub fn parse_text(&self, text: &str) -> Result<DefinitionFile, ParseError> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() > MAX_TABLE_LINES {
            return Err(ParseError::TooManyLines(lines.len()));
        }
        if lines.len() < MIN_LINE_COUNT {
            return Err(ParseError::TooShort {
                expected: MIN_LINE_COUNT,
                found: lines.len(),
            });
        }

        let header: Vec<Vec<&str>> = lines[..HEADER_LINE_COUNT]
            .iter()
            .map(|l| split_fields(l))
            .collect();

        let mut ctx = ParseContext::new();
        self.read_chromosome_line(&mut ctx, &header[LINE_CHROMO])?;
        self.read_header_lines(&mut ctx, &header)?;

        for (idx, raw) in lines.iter().enumerate().skip(HEADER_LINE_COUNT) {
            self.read_body_line(&mut ctx, idx + 1, raw)?;
        }

        let definition = ctx.finish(lines.len(), &self.config.version_tag)?;
        info!(
            "Parsed {}: {} variants, {} named alleles, {} notes",
            definition.gene_symbol,
            definition.variants.len(),
            definition.named_alleles.len(),
            definition.notes.len()
        );
        Ok(definition)
    }

    /// Chromosome line: `RefSeq`, build, chromosome name and the variant count
    fn read_chromosome_line(
        &self,
        ctx: &mut ParseContext,
        fields: &[&str],
    ) -> Result<(), ParseError> {
        let line = LINE_CHROMO + 1;
        let title = cell(fields, 1);
        if title.is_empty() {
            return Err(ParseError::Structural {
                line,
                message: "No chromosomal position description specified".to_string(),
            });
        }

        let refseq = grammar::find_refseq(title)
            .map_err(|e| field_error(line, 2, FieldRole::ChromosomeRefSeq, e))?;
        let name = chromosome_name(refseq.number).ok_or(ParseError::ChromosomeOutOfRange {
            line,
            number: refseq.number,
        })?;
        let named_build = grammar::find_genome_build(title)
            .map_err(|e| field_error(line, 2, FieldRole::GenomeBuild, e))?;

        let build = self
            .assemblies
            .resolve(refseq.accession)
            .ok_or_else(|| ParseError::UnknownAccession {
                line,
                accession: refseq.accession.to_string(),
            })?;
        if !self.config.permitted_builds.contains(&build) {
            return Err(ParseError::BuildNotPermitted {
                line,
                build,
                permitted: self.config.permitted_builds.clone(),
            });
        }
        if GenomeBuild::parse(named_build) != Some(build) {
            return Err(ParseError::BuildMismatch {
                line,
                accession: refseq.accession.to_string(),
                resolved: build,
                named: named_build.to_string(),
            });
        }

        let last_variant_column = fields
            .iter()
            .enumerate()
            .skip(FIRST_VARIANT_COLUMN)
            .filter(|(_, f)| !f.is_empty())
            .map(|(i, _)| i)
            .last()
            .ok_or_else(|| ParseError::Structural {
                line,
                message: "No variant positions specified".to_string(),
            })?;
        let num_variants = last_variant_column - 1;
        if exceeds_variant_limit(num_variants) {
            return Err(ParseError::TooManyVariants(num_variants));
        }

        let mut variants = Vec::with_capacity(num_variants);
        for (i, position) in variant_cells(fields, num_variants).enumerate() {
            grammar::parse_positions(position).map_err(|e| {
                field_error(
                    line,
                    FIRST_VARIANT_COLUMN + i + 1,
                    FieldRole::ChromosomePosition,
                    e,
                )
            })?;
            variants.push(Variant {
                chromosome_position: position.to_string(),
                ..Variant::default()
            });
        }

        debug!("chromosome seq: {}", refseq.accession);
        debug!("chromosome name: {name}");
        debug!("genome build: {build} ({named_build})");
        debug!("# variants specified: {num_variants}");

        ctx.chromosome_refseq = refseq.accession.to_string();
        ctx.chromosome_name = name;
        ctx.genome_build = build;
        ctx.num_variants = num_variants;
        ctx.variants = variants;
        Ok(())
    }

    /// The remaining fixed header lines, aligned to the variant count
    fn read_header_lines(
        &self,
        ctx: &mut ParseContext,
        header: &[Vec<&str>],
    ) -> Result<(), ParseError> {
        // gene line
        let fields = &header[LINE_GENE];
        let line = LINE_GENE + 1;
        let gene = grammar::parse_gene_field(cell(fields, 0))
            .map_err(|e| field_error(line, 1, FieldRole::GeneSymbol, e))?;
        let date = cell(fields, 1);
        grammar::parse_version_date(date)
            .map_err(|e| field_error(line, 2, FieldRole::VersionDate, e))?;
        ctx.gene_symbol = gene.to_string();
        ctx.version_date = date.to_string();
        debug!("gene: {gene}");

        // naming line
        let fields = &header[LINE_NAMING];
        let label = cell(fields, 0);
        if !label.is_empty() {
            return Err(field_error(
                LINE_NAMING + 1,
                1,
                FieldRole::NamingLine,
                GrammarError {
                    value: label.to_string(),
                },
            ));
        }
        let cells = variant_cells(fields, ctx.num_variants);
        for (variant, note) in ctx.variants.iter_mut().zip(cells) {
            variant.resource_note = note.to_string();
        }

        // protein line
        let fields = &header[LINE_PROTEIN];
        ctx.protein_refseq = described_refseq(
            fields,
            LINE_PROTEIN + 1,
            FieldRole::ProteinRefSeq,
            "No protein description specified",
        )?;
        let cells = variant_cells(fields, ctx.num_variants);
        for (variant, note) in ctx.variants.iter_mut().zip(cells) {
            variant.protein_note = note.to_string();
        }
        debug!("protein seq: {}", ctx.protein_refseq);

        // gene sequence line
        let fields = &header[LINE_GENESEQ];
        ctx.gene_refseq = described_refseq(
            fields,
            LINE_GENESEQ + 1,
            FieldRole::GeneRefSeq,
            "No gene position description specified",
        )?;
        let cells = variant_cells(fields, ctx.num_variants);
        for (variant, position) in ctx.variants.iter_mut().zip(cells) {
            variant.gene_position = position.to_string();
        }
        debug!("gene seq: {}", ctx.gene_refseq);

        // rsID line
        let fields = &header[LINE_RSID];
        let cells = variant_cells(fields, ctx.num_variants);
        for (variant, rsid) in ctx.variants.iter_mut().zip(cells) {
            variant.rsid = rsid.to_string();
        }

        Ok(())
    }

    fn read_body_line(
        &self,
        ctx: &mut ParseContext,
        line: usize,
        raw: &str,
    ) -> Result<(), ParseError> {
        let fields = split_fields(raw);
        match ctx.state {
            ParseState::ExpectNotes => {
                ctx.notes.push(raw.trim_end().to_string());
                Ok(())
            }
            _ if cell(&fields, 0).to_lowercase().starts_with(NOTES_MARKER) => {
                debug!("notes start at line {line}");
                ctx.state = ParseState::ExpectNotes;
                Ok(())
            }
            _ if fields.iter().all(|f| f.is_empty()) => Ok(()),
            ParseState::ExpectAlleleHeader => self.read_allele_header(ctx, line, &fields),
            ParseState::ExpectAlleleRows if fields.len() > 2 => {
                self.read_allele_row(ctx, line, &fields)
            }
            ParseState::ExpectAlleleRows => {
                debug!("skipping line {line}: too few fields for a named allele");
                Ok(())
            }
        }
    }

    /// Column-title row: fixed titles, then one title per population frequency column
    fn read_allele_header(
        &self,
        ctx: &mut ParseContext,
        line: usize,
        fields: &[&str],
    ) -> Result<(), ParseError> {
        expect_title(line, 0, cell(fields, 0), ALLELE_COLUMN_TITLE)?;
        expect_title(line, 1, cell(fields, 1), FUNCTION_COLUMN_TITLE)?;

        let first_population_column = FIRST_VARIANT_COLUMN + ctx.num_variants;
        let mut population_columns = Vec::new();
        for (col, title) in fields.iter().enumerate().skip(first_population_column) {
            if title.is_empty() {
                continue;
            }
            let population = grammar::parse_population_title(title)
                .map_err(|e| field_error(line, col + 1, FieldRole::PopulationTitle, e))?;
            population_columns.push((col, population.to_string()));
        }

        ctx.last_column = population_columns
            .last()
            .map_or(first_population_column - 1, |(col, _)| *col);
        debug!(
            "populations: {:?}",
            population_columns.iter().map(|(_, p)| p).collect::<Vec<_>>()
        );
        ctx.population_columns = population_columns;
        ctx.allele_header_line = Some(line);
        ctx.state = ParseState::ExpectAlleleRows;
        Ok(())
    }

    fn read_allele_row(
        &self,
        ctx: &mut ParseContext,
        line: usize,
        fields: &[&str],
    ) -> Result<(), ParseError> {
        let name = cell(fields, 0);
        if name.is_empty() {
            return Err(field_error(
                line,
                1,
                FieldRole::AlleleName,
                GrammarError {
                    value: String::new(),
                },
            ));
        }
        if ctx.allele_names.contains(name) {
            return Err(ParseError::Structural {
                line,
                message: format!("Duplicate named allele '{name}'"),
            });
        }

        let tokens: Vec<&str> = variant_cells(fields, ctx.num_variants).collect();
        grammar::validate_allele_tokens(&tokens).map_err(|tokens| {
            ParseError::InvalidAlleleTokens {
                line,
                allele: name.to_string(),
                tokens,
            }
        })?;

        if let Some(last_used) = fields.iter().rposition(|f| !f.is_empty()) {
            if last_used > ctx.last_column {
                return Err(ParseError::VariantCountMismatch {
                    line,
                    what: format!("allele '{name}'"),
                    expected: ctx.last_column + 1 - FIRST_VARIANT_COLUMN,
                    found: last_used + 1 - FIRST_VARIANT_COLUMN,
                });
            }
        }

        let id = self
            .haplotype_ids
            .resolve(&ctx.gene_symbol, name)
            .map(str::to_string);
        if id.is_none() {
            debug!("no haplotype ID for {} {name}", ctx.gene_symbol);
        }

        ctx.allele_names.insert(name.to_string());
        ctx.named_alleles.push(NamedAllele {
            id,
            name: name.to_string(),
            function: cell(fields, 1).to_string(),
            alleles: tokens.iter().map(|t| grammar::normalize_allele_token(t)).collect(),
            population_frequencies: ctx
                .population_columns
                .iter()
                .map(|(col, _)| cell(fields, *col).to_string())
                .collect(),
        });
        Ok(())
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(SEPARATOR).map(str::trim).collect()
}

/// Cell at `idx`, blank when the row is shorter
fn cell<'b>(fields: &[&'b str], idx: usize) -> &'b str {
    fields.get(idx).copied().unwrap_or("")
}

/// The `n` per-variant cells of a row, padded with blanks or truncated
fn variant_cells<'b>(fields: &'b [&'b str], n: usize) -> impl Iterator<Item = &'b str> + 'b {
    (FIRST_VARIANT_COLUMN..FIRST_VARIANT_COLUMN + n).map(move |i| cell(fields, i))
}

/// Accession from the description column (column 2) of a header line
fn described_refseq(
    fields: &[&str],
    line: usize,
    role: FieldRole,
    missing: &str,
) -> Result<String, ParseError> {
    let title = cell(fields, 1);
    if title.is_empty() {
        return Err(ParseError::Structural {
            line,
            message: missing.to_string(),
        });
    }
    grammar::find_refseq(title)
        .map(|r| r.accession.to_string())
        .map_err(|e| field_error(line, 2, role, e))
}

fn expect_title(line: usize, idx: usize, found: &str, expected: &str) -> Result<(), ParseError> {
    if found == expected {
        Ok(())
    } else {
        Err(ParseError::ColumnTitleMismatch {
            line,
            column: idx + 1,
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}

fn field_error(line: usize, column: usize, role: FieldRole, err: GrammarError) -> ParseError {
    ParseError::FieldFormat {
        line,
        column,
        role,
        value: err.value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::HaplotypeIdMap;
    use crate::parsing::error::ErrorKind;

    fn sample_lines() -> Vec<String> {
        [
            "GENE: CYP2C19\t07/12/16\t\t\t\t\t",
            "\tNomenclature\tnote1\t\tnote3\t\t",
            "\tProtein (NP_000760.1)\t\tp.I331V\t\t\t",
            "\tChromosomal position (NC_000010.11, GRCh38.p2)\tg.94761900C>T\tg.94762706A>G;g.94762712C>T\tg.94842866A>G\t\t",
            "\tGene position (NG_008384.2)\tc.-806C>T\tc.99C>T\tc.991A>G\t\t",
            "\trsID\trs12248560\trs17882687\trs3758581\t\t",
            "Allele\tAllele Functional Status\t\t\t\tEuropean Allele Frequency\tAfrican Allele Frequency",
            "*1\tNormal function\tC\tA\tA\t0.6\t0.5",
            "*2\tNo function\tC\tdelA\tG\t0.15\t0.17",
            "*17\tIncreased function\tT\tinsGG\t\t0.2\t0.16",
            "NOTES:\t\t\t\t\t\t",
            "The first note.",
            "Second note\t\t",
        ]
        .iter()
        .map(ToString::to_string)
        .collect()
    }

    fn join(lines: &[String]) -> String {
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    fn parse(lines: &[String]) -> Result<DefinitionFile, ParseError> {
        TableParser::with_config(ParserConfig::default()).parse_text(&join(lines))
    }

    #[test]
    fn test_parse_sample() {
        let definition = parse(&sample_lines()).unwrap();

        assert_eq!(definition.gene_symbol, "CYP2C19");
        assert_eq!(definition.version_date, "07/12/16");
        assert_eq!(definition.gene_refseq, "NG_008384.2");
        assert_eq!(definition.protein_refseq, "NP_000760.1");
        assert_eq!(definition.chromosome_refseq, "NC_000010.11");
        assert_eq!(definition.chromosome_name, "chr10");
        assert_eq!(definition.genome_build, GenomeBuild::B38);
        assert_eq!(definition.gene_orientation, None);

        assert_eq!(definition.variants.len(), 3);
        assert_eq!(definition.variants[0].resource_note, "note1");
        assert_eq!(definition.variants[1].protein_note, "p.I331V");
        assert_eq!(
            definition.variants[1].chromosome_position,
            "g.94762706A>G;g.94762712C>T"
        );
        assert_eq!(definition.variants[0].gene_position, "c.-806C>T");
        assert_eq!(definition.variants[2].rsid, "rs3758581");

        assert_eq!(definition.populations, vec!["European", "African"]);
        assert_eq!(definition.named_alleles.len(), 3);
        let star2 = definition.named_allele("*2").unwrap();
        assert_eq!(star2.function, "No function");
        assert_eq!(star2.alleles, vec!["C", "-", "G"]);
        assert_eq!(star2.population_frequencies, vec!["0.15", "0.17"]);
        assert_eq!(star2.id, None);

        let star17 = definition.named_allele("*17").unwrap();
        assert_eq!(star17.alleles, vec!["T", "GG", ""]);

        assert_eq!(definition.notes, vec!["The first note.", "Second note"]);
    }

    #[test]
    fn test_variant_width_invariant() {
        let definition = parse(&sample_lines()).unwrap();
        assert!(definition.find_width_mismatch().is_none());
        for allele in &definition.named_alleles {
            assert_eq!(allele.alleles.len(), definition.variants.len());
        }
    }

    #[test]
    fn test_short_allele_row_is_padded() {
        let mut lines = sample_lines();
        lines.insert(10, "*3\tNo function\tC".to_string());
        let definition = parse(&lines).unwrap();

        let star3 = definition.named_allele("*3").unwrap();
        assert_eq!(star3.alleles, vec!["C", "", ""]);
        assert_eq!(star3.population_frequencies, vec!["", ""]);
    }

    #[test]
    fn test_too_short() {
        let lines = sample_lines()[..6].to_vec();
        let err = parse(&lines).unwrap_err();
        assert!(matches!(
            err,
            ParseError::TooShort {
                expected: 7,
                found: 6
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_unsupported_build() {
        let mut lines = sample_lines();
        lines[3] = lines[3]
            .replace("NC_000010.11", "NC_000010.10")
            .replace("GRCh38.p2", "GRCh37.p13");
        let err = parse(&lines).unwrap_err();
        assert!(matches!(
            err,
            ParseError::BuildNotPermitted {
                line: 4,
                build: GenomeBuild::B37,
                ..
            }
        ));
    }

    #[test]
    fn test_permitted_older_build() {
        let mut lines = sample_lines();
        lines[3] = lines[3]
            .replace("NC_000010.11", "NC_000010.10")
            .replace("GRCh38.p2", "GRCh37.p13");
        let config = ParserConfig::default().with_permitted_builds([GenomeBuild::B37]);
        let definition = TableParser::with_config(config)
            .parse_text(&join(&lines))
            .unwrap();
        assert_eq!(definition.genome_build, GenomeBuild::B37);
    }

    #[test]
    fn test_build_token_disagrees_with_accession() {
        let mut lines = sample_lines();
        lines[3] = lines[3].replace("GRCh38.p2", "GRCh37");
        let err = parse(&lines).unwrap_err();
        assert!(matches!(err, ParseError::BuildMismatch { line: 4, .. }));
    }

    #[test]
    fn test_unknown_accession() {
        let mut lines = sample_lines();
        lines[3] = lines[3].replace("NC_000010.11", "NC_000010.99");
        let err = parse(&lines).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LookupMiss);
        assert!(err.to_string().contains("NC_000010.99"));
    }

    #[test]
    fn test_chromosome_out_of_range() {
        let mut lines = sample_lines();
        lines[3] = lines[3].replace("NC_000010.11", "NC_000025.1");
        let err = parse(&lines).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ChromosomeOutOfRange {
                line: 4,
                number: 25
            }
        ));
    }

    #[test]
    fn test_missing_build_token() {
        let mut lines = sample_lines();
        lines[3] = lines[3].replace(", GRCh38.p2", "");
        let err = parse(&lines).unwrap_err();
        assert!(matches!(
            err,
            ParseError::FieldFormat {
                role: FieldRole::GenomeBuild,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_position_named() {
        let mut lines = sample_lines();
        lines[3] = lines[3].replace("g.94842866A>G", "g94842866A>G");
        match parse(&lines).unwrap_err() {
            ParseError::FieldFormat {
                line,
                column,
                role,
                value,
            } => {
                assert_eq!(line, 4);
                assert_eq!(column, 5);
                assert_eq!(role, FieldRole::ChromosomePosition);
                assert_eq!(value, "g94842866A>G");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_position_inside_variant_range() {
        let mut lines = sample_lines();
        lines[3] = lines[3].replace("g.94762706A>G;g.94762712C>T", "");
        let err = parse(&lines).unwrap_err();
        assert!(matches!(
            err,
            ParseError::FieldFormat {
                column: 4,
                role: FieldRole::ChromosomePosition,
                ..
            }
        ));
    }

    #[test]
    fn test_no_variant_positions() {
        let mut lines = sample_lines();
        lines[3] = "\tChromosomal position (NC_000010.11, GRCh38.p2)\t\t".to_string();
        let err = parse(&lines).unwrap_err();
        assert!(matches!(err, ParseError::Structural { line: 4, .. }));
    }

    #[test]
    fn test_bad_gene_line() {
        let mut lines = sample_lines();
        lines[0] = lines[0].replace("GENE: CYP2C19", "Gene CYP2C19");
        let err = parse(&lines).unwrap_err();
        assert!(matches!(
            err,
            ParseError::FieldFormat {
                line: 1,
                column: 1,
                role: FieldRole::GeneSymbol,
                ..
            }
        ));
    }

    #[test]
    fn test_non_ascii_gene_symbol() {
        let mut lines = sample_lines();
        lines[0] = lines[0].replace("GENE: CYP2C19", "GENE: CYP2C19é");
        let err = parse(&lines).unwrap_err();
        assert!(matches!(
            err,
            ParseError::FieldFormat {
                line: 1,
                role: FieldRole::GeneSymbol,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_date() {
        let mut lines = sample_lines();
        lines[0] = lines[0].replace("07/12/16", "2016-07-12");
        let err = parse(&lines).unwrap_err();
        assert!(matches!(
            err,
            ParseError::FieldFormat {
                line: 1,
                column: 2,
                role: FieldRole::VersionDate,
                ..
            }
        ));
    }

    #[test]
    fn test_naming_line_label_must_be_blank() {
        let mut lines = sample_lines();
        lines[1] = format!("Naming{}", lines[1]);
        let err = parse(&lines).unwrap_err();
        assert!(matches!(
            err,
            ParseError::FieldFormat {
                line: 2,
                role: FieldRole::NamingLine,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_protein_refseq() {
        let mut lines = sample_lines();
        lines[2] = lines[2].replace("Protein (NP_000760.1)", "Protein");
        let err = parse(&lines).unwrap_err();
        assert!(matches!(
            err,
            ParseError::FieldFormat {
                line: 3,
                role: FieldRole::ProteinRefSeq,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_gene_description() {
        let mut lines = sample_lines();
        lines[4] = lines[4].replace("Gene position (NG_008384.2)", "");
        let err = parse(&lines).unwrap_err();
        assert!(matches!(err, ParseError::Structural { line: 5, .. }));
    }

    #[test]
    fn test_misspelled_allele_title() {
        let mut lines = sample_lines();
        lines[6] = lines[6].replacen("Allele", "Alelle", 1);
        match parse(&lines).unwrap_err() {
            ParseError::ColumnTitleMismatch {
                line,
                column,
                expected,
                found,
            } => {
                assert_eq!(line, 7);
                assert_eq!(column, 1);
                assert_eq!(expected, "Allele");
                assert_eq!(found, "Alelle");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_function_title() {
        let mut lines = sample_lines();
        lines[6] = lines[6].replace("Allele Functional Status", "Function");
        let err = parse(&lines).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ColumnTitleMismatch { column: 2, .. }
        ));
    }

    #[test]
    fn test_bad_population_title() {
        let mut lines = sample_lines();
        lines[6] = lines[6].replace("African Allele Frequency", "African Frequency");
        let err = parse(&lines).unwrap_err();
        assert!(matches!(
            err,
            ParseError::FieldFormat {
                line: 7,
                column: 7,
                role: FieldRole::PopulationTitle,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_allele_tokens_reported_together() {
        let mut lines = sample_lines();
        lines[8] = "*2\tNo function\tX\tdelA\tinsZ\t0.15\t0.17".to_string();
        match parse(&lines).unwrap_err() {
            ParseError::InvalidAlleleTokens {
                line,
                allele,
                tokens,
            } => {
                assert_eq!(line, 9);
                assert_eq!(allele, "*2");
                assert_eq!(tokens, vec!["X", "insZ"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extra_columns_beyond_populations() {
        let mut lines = sample_lines();
        lines[7] = "*1\tNormal function\tC\tA\tA\t0.6\t0.5\tstray".to_string();
        let err = parse(&lines).unwrap_err();
        assert!(matches!(
            err,
            ParseError::VariantCountMismatch {
                line: 8,
                expected: 5,
                found: 6,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::CrossFieldInvariant);
    }

    #[test]
    fn test_blank_and_narrow_rows_skipped() {
        let mut lines = sample_lines();
        lines.insert(8, "\t\t\t\t\t\t".to_string());
        lines.insert(8, "stray\tcomment".to_string());
        lines.insert(8, String::new());
        let definition = parse(&lines).unwrap();
        assert_eq!(definition.named_alleles.len(), 3);
    }

    #[test]
    fn test_blank_lines_before_allele_header() {
        let mut lines = sample_lines();
        lines.insert(6, "\t\t\t".to_string());
        let definition = parse(&lines).unwrap();
        assert_eq!(definition.named_alleles.len(), 3);
    }

    #[test]
    fn test_missing_allele_name() {
        let mut lines = sample_lines();
        lines[7] = "\tNormal function\tC\tA\tA\t0.6\t0.5".to_string();
        let err = parse(&lines).unwrap_err();
        assert!(matches!(
            err,
            ParseError::FieldFormat {
                line: 8,
                role: FieldRole::AlleleName,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_allele_name() {
        let mut lines = sample_lines();
        lines[8] = lines[8].replace("*2", "*1");
        let err = parse(&lines).unwrap_err();
        assert!(matches!(err, ParseError::Structural { line: 9, .. }));
    }

    #[test]
    fn test_no_allele_header() {
        let lines: Vec<String> = sample_lines()[..6]
            .iter()
            .cloned()
            .chain(["Notes:".to_string(), "a note".to_string()])
            .collect();
        let err = parse(&lines).unwrap_err();
        assert!(err.to_string().contains("No allele header row"));
    }

    #[test]
    fn test_no_named_alleles() {
        let lines: Vec<String> = sample_lines()[..7].to_vec();
        let err = parse(&lines).unwrap_err();
        assert!(err.to_string().contains("No named alleles"));
    }

    #[test]
    fn test_notes_marker_case_insensitive() {
        let mut lines = sample_lines();
        lines[10] = "notes:".to_string();
        lines.push("Allele\tlooks like a row".to_string());
        let definition = parse(&lines).unwrap();
        assert_eq!(definition.named_alleles.len(), 3);
        assert_eq!(definition.notes.len(), 3);
        assert_eq!(definition.notes[2], "Allele\tlooks like a row");
    }

    #[test]
    fn test_haplotype_ids_resolved() {
        let mut ids = HaplotypeIdMap::new();
        ids.insert("CYP2C19", "*2", "PA165980635");
        let assemblies = AssemblyMap::embedded();
        let parser = TableParser::new(ParserConfig::default(), assemblies, &ids);

        let definition = parser.parse_text(&join(&sample_lines())).unwrap();
        assert_eq!(
            definition.named_allele("*2").unwrap().id.as_deref(),
            Some("PA165980635")
        );
        assert_eq!(definition.named_allele("*1").unwrap().id, None);
    }

    #[test]
    fn test_version_tag_from_config() {
        let config = ParserConfig::default().with_version_tag("r42");
        let definition = TableParser::with_config(config)
            .parse_text(&join(&sample_lines()))
            .unwrap();
        assert_eq!(definition.version_tag, "r42");
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = sample_lines().join("\r\n");
        let definition = TableParser::with_config(ParserConfig::default())
            .parse_text(&text)
            .unwrap();
        assert_eq!(definition.named_alleles.len(), 3);
        assert_eq!(definition.notes[1], "Second note");
    }
}
