//! CLI command implementations

pub mod build;
pub mod inspect;
pub mod manifest;

use crate::bundle::PartitionSources;
use crate::cli::args::{Cli, Commands};
use crate::config::AppConfig;
use anyhow::Result;

/// Execute a CLI command
pub fn execute_command(command: Commands, cli: &Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;

    match command {
        Commands::Build {
            boot,
            kernel,
            rootfs,
            output,
            cma,
            init,
            pack,
        } => build::execute_build_command(
            &config,
            build::BuildOptions {
                sources: PartitionSources {
                    boot,
                    kernel,
                    rootfs,
                },
                output: &output,
                cma: &cma,
                init,
                pack,
            },
        ),
        Commands::Inspect {
            file,
            extract,
            full,
            output_dir,
            full_output,
        } => inspect::execute_inspect_command(
            &config,
            inspect::InspectOptions {
                file: &file,
                extract,
                full,
                output_dir,
                full_output,
            },
        ),
        Commands::Manifest { file } => manifest::execute_manifest_command(&file),
    }
}
