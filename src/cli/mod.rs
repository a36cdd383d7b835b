//! Command Line Interface module
//!
//! Argument parsing and the `build`, `inspect` and `manifest` commands.

pub mod args;
pub mod commands;

pub use args::*;

use crate::utils::logging::init_cli_logging;
use anyhow::Result;

/// Main CLI application runner
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_cli_logging(cli.verbose, cli.quiet)?;

    commands::execute_command(cli.command.clone(), &cli)
}
