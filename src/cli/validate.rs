use std::path::{Path, PathBuf};

use clap::Args;
use rayon::prelude::*;

use crate::catalog::AssemblyMap;
use crate::cli::{
    check_outcomes, collect_inputs, print_outcomes, OutputFormat, ParserArgs, TableOutcome,
};
use crate::parsing::table::TableParser;
use crate::serializer::read_definition_file;
use crate::utils::validation::{is_definition_file, is_table_file};

#[derive(Args)]
pub struct ValidateArgs {
    /// Allele definition tables, or directories containing `.tsv` tables
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Inputs are generated definition files (`.tsv` or `.json`) rather than
    /// curated tables
    #[arg(long)]
    pub generated: bool,

    #[command(flatten)]
    pub parser: ParserArgs,
}

/// Execute validate subcommand
///
/// # Errors
///
/// Returns an error if inputs cannot be collected or any input is invalid.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ValidateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let accept: fn(&Path) -> bool = if args.generated {
        is_definition_file
    } else {
        is_table_file
    };
    let inputs = collect_inputs(&args.inputs, accept)?;
    let haplotype_ids = args.parser.haplotype_ids()?;
    let parser = TableParser::new(
        args.parser.config(),
        AssemblyMap::embedded(),
        haplotype_ids.as_ref(),
    );

    if verbose {
        eprintln!("Validating {} files", inputs.len());
    }

    let outcomes: Vec<TableOutcome> = inputs
        .par_iter()
        .map(|input| {
            let result = if args.generated {
                read_definition_file(input).map_err(|e| e.to_string())
            } else {
                parser.parse_file(input).map_err(|e| e.to_string())
            };
            match result {
                Ok(definition) => TableOutcome::parsed(input, &definition, None),
                Err(e) => TableOutcome::failed(input, e),
            }
        })
        .collect();

    print_outcomes(&outcomes, format)?;
    check_outcomes(&outcomes)
}
