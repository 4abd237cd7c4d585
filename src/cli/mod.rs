//! Command-line interface for allele-def.
//!
//! Available commands:
//!
//! - **convert**: Parse allele definition tables and write versioned definitions
//! - **validate**: Parse tables (or generated definitions) and report problems without writing
//! - **xlsx**: Convert allele definition spreadsheets into tab-delimited tables
//!
//! ## Usage
//!
//! ```text
//! # Spreadsheets to tables
//! allele-def xlsx curated/ -o tables/
//!
//! # Tables to definitions, resolving haplotype IDs
//! allele-def convert tables/ -o definitions/ --haplotype-ids ids.json
//!
//! # Accept GRCh37 tables as well
//! allele-def validate tables/CYP2C19.allele.translation.tsv --build b37 --build b38
//!
//! # Machine-readable summary
//! allele-def convert tables/ -o definitions/ --format json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::catalog::{HaplotypeIdMap, HaplotypeIdResolver, NoHaplotypeIds};
use crate::core::definition::DefinitionFile;
use crate::core::types::GenomeBuild;
use crate::parsing::table::ParserConfig;

pub mod convert;
pub mod validate;
pub mod xlsx;

#[derive(Parser)]
#[command(name = "allele-def")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Parse and validate allele definition tables")]
#[command(
    long_about = "allele-def turns curated allele definition tables into versioned gene definitions.\n\nEach table is checked before anything is written:\n- Header lines, column titles and HGVS positions follow the table grammar\n- The chromosome accession resolves to a permitted genome build\n- Every named allele is aligned with the defining variants"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format of the summary
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert allele definition tables into definition files
    Convert(convert::ConvertArgs),

    /// Validate allele definition tables without writing output
    Validate(validate::ValidateArgs),

    /// Convert spreadsheets (.xls/.xlsx) into tab-delimited tables
    Xlsx(xlsx::XlsxArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Options shared by every command that parses tables
#[derive(Args, Debug)]
pub struct ParserArgs {
    /// Genome build a table may use (repeat to allow several)
    #[arg(long = "build", value_enum, default_values_t = [GenomeBuild::B38])]
    pub builds: Vec<GenomeBuild>,

    /// Content version recorded in every definition
    #[arg(long, default_value = "")]
    pub version_tag: String,

    /// JSON file mapping gene -> allele name -> haplotype ID
    #[arg(long)]
    pub haplotype_ids: Option<PathBuf>,
}

impl ParserArgs {
    #[must_use]
    pub fn config(&self) -> ParserConfig {
        ParserConfig::default()
            .with_permitted_builds(self.builds.iter().copied())
            .with_version_tag(self.version_tag.clone())
    }

    /// Load the haplotype ID map, or an empty resolver when none was given
    ///
    /// # Errors
    ///
    /// Returns an error if the ID file cannot be read or parsed.
    pub fn haplotype_ids(&self) -> anyhow::Result<Box<dyn HaplotypeIdResolver>> {
        let Some(path) = &self.haplotype_ids else {
            return Ok(Box::new(NoHaplotypeIds));
        };
        let map = HaplotypeIdMap::load_from_file(path)
            .with_context(|| format!("Failed to load haplotype IDs from {}", path.display()))?;
        tracing::debug!("Loaded haplotype IDs for {} genes", map.len());
        Ok(Box::new(map))
    }
}

/// Expand files and directories into the sorted list of inputs to process.
///
/// Directories are read one level deep and filtered with `accept`; files
/// named explicitly are always kept.
///
/// # Errors
///
/// Returns an error if a path does not exist or a directory cannot be read,
/// or if no inputs remain.
pub fn collect_inputs(
    paths: &[PathBuf],
    accept: fn(&Path) -> bool,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(path)
                .with_context(|| format!("Failed to read directory {}", path.display()))?
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|p| p.is_file() && accept(p))
                .collect();
            found.sort();
            inputs.extend(found);
        } else if path.is_file() {
            inputs.push(path.clone());
        } else {
            bail!("Input not found: {}", path.display());
        }
    }

    if inputs.is_empty() {
        bail!("No input files found");
    }
    Ok(inputs)
}

/// Result of processing one input file
#[derive(Debug, Serialize)]
pub struct TableOutcome {
    pub input: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gene: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_alleles: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableOutcome {
    #[must_use]
    pub fn parsed(input: &Path, definition: &DefinitionFile, output: Option<PathBuf>) -> Self {
        Self {
            input: input.to_path_buf(),
            gene: Some(definition.gene_symbol.clone()),
            variants: Some(definition.num_variants()),
            named_alleles: Some(definition.named_alleles.len()),
            output,
            error: None,
        }
    }

    #[must_use]
    pub fn converted(input: &Path, output: PathBuf) -> Self {
        Self {
            input: input.to_path_buf(),
            gene: None,
            variants: None,
            named_alleles: None,
            output: Some(output),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(input: &Path, error: impl std::fmt::Display) -> Self {
        Self {
            input: input.to_path_buf(),
            gene: None,
            variants: None,
            named_alleles: None,
            output: None,
            error: Some(error.to_string()),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Print the per-file summary in the requested format
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print_outcomes(outcomes: &[TableOutcome], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print_text_outcomes(outcomes),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcomes)?),
        OutputFormat::Tsv => print_tsv_outcomes(outcomes),
    }
    Ok(())
}

fn print_text_outcomes(outcomes: &[TableOutcome]) {
    for outcome in outcomes {
        match &outcome.error {
            Some(error) => println!("FAIL  {}: {error}", outcome.input.display()),
            None => {
                let mut line = format!("OK    {}", outcome.input.display());
                if let (Some(gene), Some(variants), Some(alleles)) =
                    (&outcome.gene, outcome.variants, outcome.named_alleles)
                {
                    line.push_str(&format!(
                        " ({gene}: {variants} variants, {alleles} named alleles)"
                    ));
                }
                if let Some(output) = &outcome.output {
                    line.push_str(&format!(" -> {}", output.display()));
                }
                println!("{line}");
            }
        }
    }

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    println!(
        "\n{} of {} files processed successfully",
        outcomes.len() - failed,
        outcomes.len()
    );
}

fn print_tsv_outcomes(outcomes: &[TableOutcome]) {
    println!("input\tstatus\tgene\tvariants\tnamed_alleles\toutput\terror");
    for outcome in outcomes {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            outcome.input.display(),
            if outcome.is_ok() { "ok" } else { "failed" },
            outcome.gene.as_deref().unwrap_or(""),
            outcome.variants.map(|n| n.to_string()).unwrap_or_default(),
            outcome.named_alleles.map(|n| n.to_string()).unwrap_or_default(),
            outcome
                .output
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            outcome.error.as_deref().unwrap_or(""),
        );
    }
}

/// Fail the command if any input failed
///
/// # Errors
///
/// Returns an error naming the number of failed inputs.
pub fn check_outcomes(outcomes: &[TableOutcome]) -> anyhow::Result<()> {
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        bail!("{failed} of {} files failed", outcomes.len());
    }
    Ok(())
}
