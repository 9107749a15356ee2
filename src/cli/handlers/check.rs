// src/cli/handlers/check.rs

use crate::{
    cli::{dispatcher::GlobalOptions, handlers::commons},
    core::parser,
};
use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    name = "check",
    about = "Parses a script and prints its block structure without running it."
)]
struct CheckArgs {
    /// The script to check.
    file: PathBuf,
}

/// Main entry point for the `check` action.
pub fn handle(args: Vec<String>, _options: GlobalOptions) -> Result<()> {
    let check_args = CheckArgs::try_parse_from(&args)?;
    let source = commons::read_script(&check_args.file)?;
    let script = parser::parse_source(&source)?;

    print!("{}", script);
    println!(
        "\n{}",
        format!(
            t!("check.success"),
            path = check_args.file.display(),
            lines = script.line_count(),
            blocks = script.block_count()
        )
        .green()
    );
    Ok(())
}
