//! Per-partition scan results

use super::manifest::ManifestShape;
use serde::Serialize;

/// Outcome of validating one partition record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PartitionOutcome {
    /// Length and digest agree with the manifest
    Ok { name: String, size: u64, sha1: String },
    /// The record's length prefix disagrees with the declared size
    SizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },
    /// The payload digest disagrees with the stored one
    DigestMismatch {
        name: String,
        expected: String,
        actual: String,
    },
}

impl PartitionOutcome {
    pub fn name(&self) -> &str {
        match self {
            PartitionOutcome::Ok { name, .. }
            | PartitionOutcome::SizeMismatch { name, .. }
            | PartitionOutcome::DigestMismatch { name, .. } => name,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, PartitionOutcome::Ok { .. })
    }

    pub fn symbol(&self) -> &'static str {
        if self.is_ok() { "✅" } else { "❌" }
    }
}

/// Result of a complete, structurally sound scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub shape: ManifestShape,
    /// One entry per manifest partition, in manifest order
    pub outcomes: Vec<PartitionOutcome>,
    /// Total bundle length, equal to the final cursor
    pub total_bytes: usize,
}

impl ScanReport {
    /// True when every partition validated
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(PartitionOutcome::is_ok)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &PartitionOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_ok())
    }

    pub fn valid_count(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_ok()).count()
    }
}
