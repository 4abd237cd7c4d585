use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use rayon::prelude::*;
use tracing::warn;

use crate::catalog::AssemblyMap;
use crate::cli::{
    check_outcomes, collect_inputs, print_outcomes, OutputFormat, ParserArgs, TableOutcome,
};
use crate::core::definition::DefinitionFile;
use crate::parsing::error::ParseError;
use crate::parsing::table::TableParser;
use crate::serializer::{definition_file_name, write_definition_file, DefinitionFormat};
use crate::utils::validation::is_table_file;

#[derive(Args)]
pub struct ConvertArgs {
    /// Allele definition tables, or directories containing `.tsv` tables
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory to write definitions to (created if missing)
    #[arg(short, long, required = true)]
    pub output_dir: PathBuf,

    /// Format of the written definitions
    #[arg(long, value_enum, default_value = "tsv")]
    pub output_format: DefinitionFormat,

    #[command(flatten)]
    pub parser: ParserArgs,
}

/// Execute convert subcommand
///
/// Every table is parsed independently; a failing table is reported and
/// never stops the others. When several tables define the same gene, only
/// the first in input order is written.
///
/// # Errors
///
/// Returns an error if inputs cannot be collected, the output directory cannot
/// be created, or any table failed.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ConvertArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let inputs = collect_inputs(&args.inputs, is_table_file)?;
    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("Failed to create output directory {}", args.output_dir.display())
    })?;

    let haplotype_ids = args.parser.haplotype_ids()?;
    let parser = TableParser::new(
        args.parser.config(),
        AssemblyMap::embedded(),
        haplotype_ids.as_ref(),
    );

    if verbose {
        eprintln!(
            "Converting {} tables to {}",
            inputs.len(),
            args.output_dir.display()
        );
    }

    let parsed: Vec<_> = inputs
        .par_iter()
        .map(|input| parser.parse_file(input))
        .collect();
    let planned = claim_outputs(&inputs, parsed, args.output_format);

    let outcomes: Vec<TableOutcome> = inputs
        .par_iter()
        .zip(planned)
        .map(|(input, plan)| match plan {
            Ok(definition) => {
                write_table(input, &definition, &args.output_dir, args.output_format)
            }
            Err(outcome) => outcome,
        })
        .collect();

    print_outcomes(&outcomes, format)?;
    check_outcomes(&outcomes)
}

/// Give each output file to the first input (in input order) that produces it.
///
/// Later tables for the same gene fail instead of overwriting the earlier
/// definition.
fn claim_outputs(
    inputs: &[PathBuf],
    parsed: Vec<Result<DefinitionFile, ParseError>>,
    output_format: DefinitionFormat,
) -> Vec<Result<DefinitionFile, TableOutcome>> {
    let mut claimed: HashMap<String, &Path> = HashMap::new();
    inputs
        .iter()
        .zip(parsed)
        .map(|(input, result)| {
            let definition = result.map_err(|e| {
                warn!("{}: {e}", input.display());
                TableOutcome::failed(input, e)
            })?;
            // unsafe names are reported when writing
            let Ok(name) = definition_file_name(&definition.gene_symbol, output_format) else {
                return Ok(definition);
            };
            if let Some(first) = claimed.get(&name) {
                let message = format!(
                    "gene {} is already converted from {}",
                    definition.gene_symbol,
                    first.display()
                );
                warn!("{}: {message}", input.display());
                return Err(TableOutcome::failed(input, message));
            }
            claimed.insert(name, input.as_path());
            Ok(definition)
        })
        .collect()
}

fn write_table(
    input: &Path,
    definition: &DefinitionFile,
    output_dir: &Path,
    output_format: DefinitionFormat,
) -> TableOutcome {
    match write_definition_file(output_dir, definition, output_format) {
        Ok(path) => TableOutcome::parsed(input, definition, Some(path)),
        Err(e) => {
            warn!("{}: {e}", input.display());
            TableOutcome::failed(input, e)
        }
    }
}
