//! `build` command: pack partition images into a bundle

use crate::bundle::{BundleBuilder, Packing, PartitionSources, write_bundle};
use crate::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

pub struct BuildOptions<'a> {
    pub sources: PartitionSources,
    pub output: &'a Path,
    pub cma: &'a str,
    pub init: bool,
    pub pack: bool,
}

pub fn execute_build_command(config: &AppConfig, options: BuildOptions<'_>) -> Result<()> {
    if options.sources.is_empty() {
        log::warn!("No partition images given, writing a bundle without partitions");
    }

    let packing = if options.pack {
        Packing::Tight
    } else {
        Packing::FixedSlot
    };
    let builder = BundleBuilder::new(config.manifest.clone())
        .packing(packing)
        .init(options.init)
        .cma(options.cma);

    let manifest = write_bundle(&options.sources, builder, options.output)
        .with_context(|| format!("Failed to build bundle {}", options.output.display()))?;

    for partition in &manifest.partitions {
        println!(
            "📦 {: <10}{: <16}{}",
            partition.name,
            format!("0x{:x}", partition.payload_size),
            partition.sha1.as_deref().unwrap_or("")
        );
    }
    println!("✅ Bundle written to {}", options.output.display());
    Ok(())
}
