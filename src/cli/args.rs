//! Command line argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "fwbundle")]
#[command(about = "📦 Pack boot, kernel and rootfs images into one bundle, then validate or extract it")]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease logging verbosity (only errors)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to the per-user config.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build a bundle from partition images
    Build {
        /// U-Boot image file
        #[arg(short, long)]
        boot: Option<PathBuf>,
        /// Kernel image file
        #[arg(short, long)]
        kernel: Option<PathBuf>,
        /// Root filesystem image file
        #[arg(short, long)]
        rootfs: Option<PathBuf>,
        /// Output bundle file
        #[arg(short, long)]
        output: PathBuf,
        /// CMA allocator parameters for the kernel command line
        #[arg(short, long, default_value = "")]
        cma: String,
        /// Add init=/init to the kernel command line
        #[arg(short, long)]
        init: bool,
        /// Pack partitions tightly, without fixed slot bounds
        #[arg(short, long)]
        pack: bool,
    },
    /// Validate a bundle and optionally extract its partitions
    Inspect {
        /// Bundle or flash dump file
        file: PathBuf,
        /// Write each valid partition to its own file
        #[arg(short, long, conflicts_with = "full")]
        extract: bool,
        /// Write all valid partitions into a single file
        #[arg(short, long)]
        full: bool,
        /// Directory for extracted partitions
        #[arg(short = 'd', long, requires = "extract")]
        output_dir: Option<PathBuf>,
        /// Aggregate image path (defaults to the configured full image name)
        #[arg(long, requires = "full")]
        full_output: Option<PathBuf>,
    },
    /// Print the manifest header of a bundle as JSON
    Manifest {
        /// Bundle or flash dump file
        file: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
