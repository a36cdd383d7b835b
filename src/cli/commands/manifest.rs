//! `manifest` command: show a bundle header

use crate::bundle::read_manifest;
use anyhow::{Context, Result};
use std::path::Path;

pub fn execute_manifest_command(file: &Path) -> Result<()> {
    let data =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let (document, body_offset) = read_manifest(&data)
        .with_context(|| format!("Failed to parse manifest of {}", file.display()))?;

    log::debug!(
        "{:?} manifest, records start at offset 0x{:x}",
        document.shape(),
        body_offset
    );
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
