//! The versioned, tab-delimited definition format.
//!
//! ```text
//! FormatVersion   1
//! GeneName        CYP2C19
//! ...
//! NumVariants     3
//! ResourceNote    <blank> <blank> <blank> note1 ...
//! ...
//! Header  ID      Name    FunctionStatus
//! Allele  <id>    *2      No function     C       -       G
//! Note    free text
//! ```
//!
//! Annotation rows carry three blank columns after the label so their values
//! line up with the allele columns of the `Allele` rows.

use crate::core::definition::{DefinitionFile, NamedAllele, Variant};
use crate::core::types::GenomeBuild;
use crate::parsing::error::{FieldRole, ParseError};
use crate::utils::validation::MAX_VARIANTS;

/// Version written on the first line of every generated file
pub const FORMAT_VERSION: u32 = 1;

const SEPARATOR: &str = "\t";
const ANNOTATION_PADDING: usize = 3;

const KEY_FORMAT_VERSION: &str = "FormatVersion";
const KEY_GENE_NAME: &str = "GeneName";
const KEY_GENE_REFSEQ: &str = "GeneRefSeq";
const KEY_GENE_ORIENTATION: &str = "GeneOrientation";
const KEY_CONTENT_DATE: &str = "ContentDate";
const KEY_CONTENT_VERSION: &str = "ContentVersion";
const KEY_GENOME_BUILD: &str = "GenomeBuild";
const KEY_CHR_NAME: &str = "ChrName";
const KEY_CHR_REFSEQ: &str = "ChrRefSeq";
const KEY_PROTEIN_REFSEQ: &str = "ProteinRefSeq";
const KEY_NUM_VARIANTS: &str = "NumVariants";
const KEY_RESOURCE_NOTE: &str = "ResourceNote";
const KEY_PROTEIN_NOTE: &str = "ProteinNote";
const KEY_CHR_POSITION: &str = "ChrPosition";
const KEY_GENE_POSITION: &str = "GenePosition";
const KEY_RSID: &str = "rsID";
const KEY_HEADER: &str = "Header";
const KEY_ALLELE: &str = "Allele";
const KEY_NOTE: &str = "Note";

const HEADER_TITLES: [&str; 4] = [KEY_HEADER, "ID", "Name", "FunctionStatus"];

const ANNOTATION_KEYS: [&str; 5] = [
    KEY_RESOURCE_NOTE,
    KEY_PROTEIN_NOTE,
    KEY_CHR_POSITION,
    KEY_GENE_POSITION,
    KEY_RSID,
];

fn annotation<'v>(variant: &'v Variant, key: &str) -> &'v str {
    match key {
        KEY_RESOURCE_NOTE => &variant.resource_note,
        KEY_PROTEIN_NOTE => &variant.protein_note,
        KEY_CHR_POSITION => &variant.chromosome_position,
        KEY_GENE_POSITION => &variant.gene_position,
        _ => &variant.rsid,
    }
}

fn annotation_mut<'v>(variant: &'v mut Variant, key: &str) -> &'v mut String {
    match key {
        KEY_RESOURCE_NOTE => &mut variant.resource_note,
        KEY_PROTEIN_NOTE => &mut variant.protein_note,
        KEY_CHR_POSITION => &mut variant.chromosome_position,
        KEY_GENE_POSITION => &mut variant.gene_position,
        _ => &mut variant.rsid,
    }
}

/// Render a definition in the generated format.
///
/// Output is deterministic: the same definition always renders to the same text.
#[must_use]
pub fn write_generated(definition: &DefinitionFile) -> String {
    let mut lines: Vec<String> = vec![
        metadata_row(KEY_FORMAT_VERSION, &FORMAT_VERSION.to_string()),
        metadata_row(KEY_GENE_NAME, &definition.gene_symbol),
        metadata_row(KEY_GENE_REFSEQ, &definition.gene_refseq),
        metadata_row(
            KEY_GENE_ORIENTATION,
            definition.gene_orientation.as_deref().unwrap_or(""),
        ),
        metadata_row(KEY_CONTENT_DATE, &definition.version_date),
        metadata_row(KEY_CONTENT_VERSION, &definition.version_tag),
        metadata_row(KEY_GENOME_BUILD, definition.genome_build.tag()),
        metadata_row(KEY_CHR_NAME, &definition.chromosome_name),
        metadata_row(KEY_CHR_REFSEQ, &definition.chromosome_refseq),
        metadata_row(KEY_PROTEIN_REFSEQ, &definition.protein_refseq),
        metadata_row(KEY_NUM_VARIANTS, &definition.num_variants().to_string()),
    ];

    for key in ANNOTATION_KEYS {
        let mut row = vec![key];
        row.extend(std::iter::repeat("").take(ANNOTATION_PADDING));
        row.extend(definition.variants.iter().map(|v| annotation(v, key)));
        lines.push(row.join(SEPARATOR));
    }

    lines.push(HEADER_TITLES.join(SEPARATOR));
    for allele in &definition.named_alleles {
        let mut row = vec![
            KEY_ALLELE,
            allele.id.as_deref().unwrap_or(""),
            allele.name.as_str(),
            allele.function.as_str(),
        ];
        row.extend(allele.alleles.iter().map(String::as_str));
        lines.push(row.join(SEPARATOR));
    }
    for note in &definition.notes {
        lines.push(metadata_row(KEY_NOTE, note));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn metadata_row(key: &str, value: &str) -> String {
    format!("{key}{SEPARATOR}{value}")
}

/// Line cursor over generated text
struct Reader<'t> {
    lines: std::iter::Enumerate<std::str::Lines<'t>>,
    line: usize,
}

impl<'t> Reader<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            line: 0,
        }
    }

    fn next_line(&mut self) -> Option<&'t str> {
        let (idx, raw) = self.lines.next()?;
        self.line = idx + 1;
        Some(raw)
    }

    fn expect_line(&mut self, key: &str) -> Result<Vec<&'t str>, ParseError> {
        let Some(raw) = self.next_line() else {
            return Err(ParseError::Structural {
                line: self.line + 1,
                message: format!("Unexpected end of file, expected '{key}'"),
            });
        };
        let fields: Vec<&str> = raw.split(SEPARATOR).collect();
        if fields[0] != key {
            return Err(ParseError::ColumnTitleMismatch {
                line: self.line,
                column: 1,
                expected: key.to_string(),
                found: fields[0].to_string(),
            });
        }
        Ok(fields)
    }

    fn metadata(&mut self, key: &str) -> Result<&'t str, ParseError> {
        let fields = self.expect_line(key)?;
        Ok(fields.get(1).copied().unwrap_or(""))
    }

    fn invalid(&self, value: &str) -> ParseError {
        ParseError::FieldFormat {
            line: self.line,
            column: 2,
            role: FieldRole::MetadataValue,
            value: value.to_string(),
        }
    }

    /// Annotation row values, checked against the declared variant count
    fn annotation(&mut self, key: &str, num_variants: usize) -> Result<Vec<&'t str>, ParseError> {
        let fields = self.expect_line(key)?;
        let values = fields.get(1 + ANNOTATION_PADDING..).unwrap_or_default();
        if values.len() != num_variants {
            return Err(ParseError::VariantCountMismatch {
                line: self.line,
                what: format!("{key} row"),
                expected: num_variants,
                found: values.len(),
            });
        }
        Ok(values.to_vec())
    }
}

/// Read a definition back from the generated format.
///
/// Population names and frequencies are not part of the format, so the
/// returned definition has none.
///
/// # Errors
///
/// Returns `ParseError` if rows are missing or out of order, the format
/// version is unsupported, the gene name is blank, no allele is defined, or
/// a row's width disagrees with `NumVariants`.
pub fn read_generated(text: &str) -> Result<DefinitionFile, ParseError> {
    let mut reader = Reader::new(text);

    let version = reader.metadata(KEY_FORMAT_VERSION)?;
    if version.parse::<u32>().ok() != Some(FORMAT_VERSION) {
        return Err(reader.invalid(version));
    }

    let gene_symbol = reader.metadata(KEY_GENE_NAME)?;
    if gene_symbol.is_empty() {
        return Err(reader.invalid(gene_symbol));
    }
    let gene_symbol = gene_symbol.to_string();
    let gene_refseq = reader.metadata(KEY_GENE_REFSEQ)?.to_string();
    let orientation = reader.metadata(KEY_GENE_ORIENTATION)?;
    let gene_orientation = (!orientation.is_empty()).then(|| orientation.to_string());
    let version_date = reader.metadata(KEY_CONTENT_DATE)?.to_string();
    let version_tag = reader.metadata(KEY_CONTENT_VERSION)?.to_string();
    let build = reader.metadata(KEY_GENOME_BUILD)?;
    let genome_build = GenomeBuild::parse(build).ok_or_else(|| reader.invalid(build))?;
    let chromosome_name = reader.metadata(KEY_CHR_NAME)?.to_string();
    let chromosome_refseq = reader.metadata(KEY_CHR_REFSEQ)?.to_string();
    let protein_refseq = reader.metadata(KEY_PROTEIN_REFSEQ)?.to_string();

    let count = reader.metadata(KEY_NUM_VARIANTS)?;
    let num_variants: usize = count.parse().map_err(|_| reader.invalid(count))?;
    if num_variants > MAX_VARIANTS {
        return Err(ParseError::TooManyVariants(num_variants));
    }

    let mut variants = vec![Variant::default(); num_variants];
    for key in ANNOTATION_KEYS {
        let values = reader.annotation(key, num_variants)?;
        for (variant, value) in variants.iter_mut().zip(values) {
            *annotation_mut(variant, key) = value.to_string();
        }
    }

    let titles = reader.expect_line(KEY_HEADER)?;
    if titles != HEADER_TITLES {
        return Err(ParseError::Structural {
            line: reader.line,
            message: format!("Malformed header row: {}", titles.join(", ")),
        });
    }

    let mut named_alleles = Vec::new();
    let mut notes: Vec<String> = Vec::new();
    while let Some(raw) = reader.next_line() {
        let (key, rest) = raw.split_once(SEPARATOR).unwrap_or((raw, ""));
        match key {
            KEY_ALLELE if notes.is_empty() => {
                let fields: Vec<&str> = raw.split(SEPARATOR).collect();
                if fields.len() < HEADER_TITLES.len() {
                    return Err(ParseError::Structural {
                        line: reader.line,
                        message: "Allele row is missing ID, name or function".to_string(),
                    });
                }
                let alleles = &fields[HEADER_TITLES.len()..];
                if alleles.len() != num_variants {
                    return Err(ParseError::VariantCountMismatch {
                        line: reader.line,
                        what: format!("allele '{}'", fields[2]),
                        expected: num_variants,
                        found: alleles.len(),
                    });
                }
                named_alleles.push(NamedAllele {
                    id: (!fields[1].is_empty()).then(|| fields[1].to_string()),
                    name: fields[2].to_string(),
                    function: fields[3].to_string(),
                    alleles: alleles.iter().map(ToString::to_string).collect(),
                    population_frequencies: Vec::new(),
                });
            }
            KEY_NOTE => notes.push(rest.to_string()),
            _ => {
                return Err(ParseError::Structural {
                    line: reader.line,
                    message: format!("Unexpected row '{key}'"),
                });
            }
        }
    }
    if named_alleles.is_empty() {
        return Err(ParseError::Structural {
            line: reader.line,
            message: "No named alleles defined".to_string(),
        });
    }

    Ok(DefinitionFile {
        gene_symbol,
        gene_refseq,
        gene_orientation,
        version_date,
        version_tag,
        genome_build,
        chromosome_name,
        chromosome_refseq,
        protein_refseq,
        variants,
        populations: Vec::new(),
        named_alleles,
        notes,
    })
}
