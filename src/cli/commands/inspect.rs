//! `inspect` command: validate a bundle, optionally extracting partitions

use crate::bundle::{ScanMode, scan_file};
use crate::config::AppConfig;
use crate::models::{PartitionOutcome, ScanReport};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct InspectOptions<'a> {
    pub file: &'a Path,
    pub extract: bool,
    pub full: bool,
    pub output_dir: Option<PathBuf>,
    pub full_output: Option<PathBuf>,
}

/// Resolve the mutually exclusive reader flags into a scan mode
pub fn scan_mode(config: &AppConfig, options: &InspectOptions<'_>) -> ScanMode {
    if options.extract {
        ScanMode::Extract {
            dir: options
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    } else if options.full {
        ScanMode::Concatenate {
            path: options
                .full_output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.inspect.full_image_name)),
        }
    } else {
        ScanMode::Summary
    }
}

/// One report line per partition, as printed by the CLI
pub fn format_outcome(outcome: &PartitionOutcome, mode: &ScanMode) -> String {
    match outcome {
        PartitionOutcome::Ok { name, size, sha1 } => match mode {
            ScanMode::Summary => format!(
                "{}  {: <10}{: <16}{}",
                outcome.symbol(),
                name,
                format!("0x{:x}", size),
                sha1
            ),
            ScanMode::Extract { .. } => format!("Writing {} {}Kb...", name, size / 1024),
            ScanMode::Concatenate { .. } => format!("{} {} appended", outcome.symbol(), name),
        },
        PartitionOutcome::SizeMismatch {
            name,
            expected,
            actual,
        } => format!(
            "For '{}' expected size 0x{:x}, actual 0x{:x}, skipping {}",
            name,
            expected,
            actual,
            outcome.symbol()
        ),
        PartitionOutcome::DigestMismatch {
            name,
            expected,
            actual,
        } => format!(
            "Checking SHA1 digest failed for '{}', expected {}, got {} {}",
            name,
            expected,
            actual,
            outcome.symbol()
        ),
    }
}

fn print_report(report: &ScanReport, mode: &ScanMode) {
    for outcome in &report.outcomes {
        println!("{}", format_outcome(outcome, mode));
    }
    if let ScanMode::Concatenate { path } = mode {
        println!("💾 Valid partitions written to {}", path.display());
    }
}

pub fn execute_inspect_command(config: &AppConfig, options: InspectOptions<'_>) -> Result<()> {
    let mode = scan_mode(config, &options);
    log::debug!("Inspecting {} in {:?} mode", options.file.display(), mode);

    let report = scan_file(options.file, &mode)
        .with_context(|| format!("Failed to read bundle {}", options.file.display()))?;
    print_report(&report, &mode);

    let warnings = report.warnings().count();
    if warnings > 0 {
        log::warn!(
            "{} of {} partitions failed validation",
            warnings,
            report.outcomes.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line_layout() {
        let outcome = PartitionOutcome::Ok {
            name: "boot".to_string(),
            size: 0x50000,
            sha1: "1a2b3c4d".to_string(),
        };
        assert_eq!(
            format_outcome(&outcome, &ScanMode::Summary),
            "✅  boot      0x50000         1a2b3c4d"
        );
    }

    #[test]
    fn test_size_mismatch_line() {
        let outcome = PartitionOutcome::SizeMismatch {
            name: "kernel".to_string(),
            expected: 8,
            actual: 7,
        };
        assert_eq!(
            format_outcome(&outcome, &ScanMode::Summary),
            "For 'kernel' expected size 0x8, actual 0x7, skipping ❌"
        );
    }

    #[test]
    fn test_scan_mode_resolution() {
        let config = AppConfig::default();
        let mut options = InspectOptions {
            file: Path::new("dump.bin"),
            extract: false,
            full: true,
            output_dir: None,
            full_output: None,
        };
        assert_eq!(
            scan_mode(&config, &options),
            ScanMode::Concatenate {
                path: PathBuf::from("ff.img")
            }
        );

        options.full = false;
        assert_eq!(scan_mode(&config, &options), ScanMode::Summary);

        options.extract = true;
        assert_eq!(
            scan_mode(&config, &options),
            ScanMode::Extract {
                dir: PathBuf::from(".")
            }
        );
    }
}
