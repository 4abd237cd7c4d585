use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use rayon::prelude::*;
use tracing::warn;

use crate::cli::{check_outcomes, collect_inputs, print_outcomes, OutputFormat, TableOutcome};
use crate::parsing::excel::convert_to_tsv;
use crate::utils::validation::is_spreadsheet_file;

#[derive(Args)]
pub struct XlsxArgs {
    /// Spreadsheets (.xls/.xlsx), or directories containing them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory to write tables to (created if missing)
    #[arg(short, long, required = true)]
    pub output_dir: PathBuf,
}

/// Execute xlsx subcommand
///
/// # Errors
///
/// Returns an error if inputs cannot be collected, the output directory cannot
/// be created, or any spreadsheet failed to convert.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: XlsxArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let inputs = collect_inputs(&args.inputs, is_spreadsheet_file)?;
    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("Failed to create output directory {}", args.output_dir.display())
    })?;

    if verbose {
        eprintln!("Converting {} spreadsheets", inputs.len());
    }

    let outcomes: Vec<TableOutcome> = inputs
        .par_iter()
        .map(|input| match convert_to_tsv(input, &args.output_dir) {
            Ok(output) => TableOutcome::converted(input, output),
            Err(e) => {
                warn!("{}: {e}", input.display());
                TableOutcome::failed(input, e)
            }
        })
        .collect();

    print_outcomes(&outcomes, format)?;
    check_outcomes(&outcomes)
}
