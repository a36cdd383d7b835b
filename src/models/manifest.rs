//! Manifest header models
//!
//! A bundle starts with a structured text header terminated by a NUL byte.
//! Two shapes of that header exist in the wild:
//!
//! - the bundle shape written by this crate, with `partitions` at the top
//!   level next to the boot parameters;
//! - the device descriptor shape found in flash dumps, which nests the
//!   partition table under `rom[0].partitions`.
//!
//! Both are read through [`ManifestDocument`]; only the bundle shape is written.

use crate::config::ManifestDefaults;
use crate::errors::{BundleError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Partitions the writer knows how to pack, in their physical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionKind {
    Boot,
    Kernel,
    Rootfs,
}

impl PartitionKind {
    /// All kinds in bundle order
    pub const ALL: [PartitionKind; 3] = [
        PartitionKind::Boot,
        PartitionKind::Kernel,
        PartitionKind::Rootfs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PartitionKind::Boot => "boot",
            PartitionKind::Kernel => "kernel",
            PartitionKind::Rootfs => "rootfs",
        }
    }

    /// Bytes reserved for this partition in the device flash layout
    pub fn slot_capacity(&self) -> u64 {
        match self {
            PartitionKind::Boot => 0x50000,
            PartitionKind::Kernel => 0x200000,
            PartitionKind::Rootfs => 0x500000,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of the partition table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionSpec {
    pub name: String,
    /// Declared payload length; device descriptors call it `size`
    #[serde(alias = "size")]
    pub payload_size: u64,
    /// Truncated SHA-1 of the payload (first 8 hex characters)
    #[serde(
        default,
        deserialize_with = "deserialize_digest",
        skip_serializing_if = "Option::is_none"
    )]
    pub sha1: Option<String>,
    /// Fixed slot capacity, only emitted by the writer in fixed-slot mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_size: Option<u64>,
}

impl PartitionSpec {
    /// Stored digest, if one is present and non-empty
    pub fn expected_digest(&self) -> Option<&str> {
        self.sha1.as_deref().filter(|digest| !digest.is_empty())
    }
}

// Plain YAML scalars like `sha1: 00123456` arrive as integers.
fn deserialize_digest<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDigest {
        Text(String),
        Number(u64),
    }

    Ok(match Option::<RawDigest>::deserialize(deserializer)? {
        Some(RawDigest::Text(text)) => Some(text),
        Some(RawDigest::Number(number)) => Some(format!("{:08}", number)),
        None => None,
    })
}

/// Bundle-shaped manifest, the canonical header written by the bundle writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default = "default_kernel_mem")]
    pub kernel_mem: String,
    #[serde(default = "default_set_total_mem")]
    pub set_total_mem: bool,
    #[serde(default)]
    pub mtd_prefix: String,
    #[serde(default)]
    pub osmem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_cmdline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<Vec<String>>,
    pub partitions: Vec<PartitionSpec>,
}

fn default_kernel_mem() -> String {
    ManifestDefaults::default().kernel_mem
}

fn default_set_total_mem() -> bool {
    true
}

impl Manifest {
    /// Empty manifest seeded with boot parameter defaults
    pub fn from_defaults(defaults: &ManifestDefaults) -> Self {
        Self {
            kernel_mem: defaults.kernel_mem.clone(),
            set_total_mem: defaults.set_total_mem,
            mtd_prefix: defaults.mtd_prefix.clone(),
            osmem: defaults.osmem.clone(),
            additional_cmdline: None,
            skip: None,
            partitions: Vec::new(),
        }
    }

    /// Header text as written into a bundle
    pub fn to_header_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::from_defaults(&ManifestDefaults::default())
    }
}

/// Flash dump descriptor shape, read for compatibility only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub rom: Vec<RomDescriptor>,
}

/// One flash chip in a device descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomDescriptor {
    #[serde(default)]
    pub partitions: Vec<PartitionSpec>,
}

/// Which header shape a bundle carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestShape {
    Bundle,
    DeviceDescriptor,
}

/// A parsed manifest header of either shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ManifestDocument {
    Bundle(Manifest),
    Device(DeviceDescriptor),
}

impl ManifestDocument {
    /// Parse header text (without its NUL terminator)
    pub fn parse(text: &[u8]) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_slice(text)?;

        let document = if value.get("partitions").is_some() {
            ManifestDocument::Bundle(serde_yaml::from_value(value)?)
        } else if value.get("rom").is_some() {
            let descriptor: DeviceDescriptor = serde_yaml::from_value(value)?;
            if descriptor.rom.is_empty() {
                return Err(BundleError::ManifestParse(
                    "device descriptor lists no rom entries".to_string(),
                ));
            }
            ManifestDocument::Device(descriptor)
        } else {
            return Err(BundleError::ManifestParse(
                "header has neither 'partitions' nor 'rom[0].partitions'".to_string(),
            ));
        };

        document.check_unique_names()?;
        log::debug!(
            "Parsed {:?} manifest with {} partitions",
            document.shape(),
            document.partitions().len()
        );
        Ok(document)
    }

    pub fn shape(&self) -> ManifestShape {
        match self {
            ManifestDocument::Bundle(_) => ManifestShape::Bundle,
            ManifestDocument::Device(_) => ManifestShape::DeviceDescriptor,
        }
    }

    /// Partition table in physical record order
    pub fn partitions(&self) -> &[PartitionSpec] {
        match self {
            ManifestDocument::Bundle(manifest) => &manifest.partitions,
            ManifestDocument::Device(descriptor) => descriptor
                .rom
                .first()
                .map(|rom| rom.partitions.as_slice())
                .unwrap_or(&[]),
        }
    }

    fn check_unique_names(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for partition in self.partitions() {
            if !seen.insert(partition.name.as_str()) {
                return Err(BundleError::ManifestParse(format!(
                    "duplicate partition name '{}'",
                    partition.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_shape_from_json() {
        let text = br#"{"kernelMem":"${totalmem}","setTotalMem":true,"mtdPrefix":"hi_sfc:","osmem":"32M","partitions":[{"name":"kernel","payloadSize":16,"sha1":"deadbeef","partitionSize":2097152}]}"#;
        let document = ManifestDocument::parse(text).unwrap();

        assert_eq!(document.shape(), ManifestShape::Bundle);
        let partitions = document.partitions();
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].payload_size, 16);
        assert_eq!(partitions[0].expected_digest(), Some("deadbeef"));
        assert_eq!(partitions[0].partition_size, Some(0x200000));
    }

    #[test]
    fn test_device_descriptor_shape_with_hex_sizes() {
        let text = b"---\nrom:\n  - type: nor\n    block: 64K\n    partitions:\n      - name: boot\n        size: 0x50000\n        sha1: 1a2b3c4d\n      - name: kernel\n        size: 0x200000\n";
        let document = ManifestDocument::parse(text).unwrap();

        assert_eq!(document.shape(), ManifestShape::DeviceDescriptor);
        let partitions = document.partitions();
        assert_eq!(partitions[0].name, "boot");
        assert_eq!(partitions[0].payload_size, 0x50000);
        assert_eq!(partitions[0].expected_digest(), Some("1a2b3c4d"));
        assert_eq!(partitions[1].expected_digest(), None);
    }

    #[test]
    fn test_numeric_digest_keeps_leading_zeros() {
        let text = b"partitions:\n  - name: boot\n    size: 4\n    sha1: 00123456\n";
        let document = ManifestDocument::parse(text).unwrap();
        assert_eq!(document.partitions()[0].expected_digest(), Some("00123456"));
    }

    #[test]
    fn test_empty_digest_is_ignored() {
        let spec = PartitionSpec {
            name: "rootfs".to_string(),
            payload_size: 1,
            sha1: Some(String::new()),
            partition_size: None,
        };
        assert_eq!(spec.expected_digest(), None);
    }

    #[test]
    fn test_syntax_error_is_manifest_parse_error() {
        let err = ManifestDocument::parse(b"partitions: [ {name: boot").unwrap_err();
        assert!(matches!(err, BundleError::ManifestParse(_)));
    }

    #[test]
    fn test_header_without_partition_table_is_rejected() {
        let err = ManifestDocument::parse(b"kernelMem: 64M\n").unwrap_err();
        assert!(matches!(err, BundleError::ManifestParse(_)));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let text = b"partitions:\n  - {name: boot, size: 1}\n  - {name: boot, size: 2}\n";
        let err = ManifestDocument::parse(text).unwrap_err();
        assert!(err.to_string().contains("duplicate partition name 'boot'"));
    }

    #[test]
    fn test_serialized_manifest_omits_absent_fields() {
        let mut manifest = Manifest::default();
        manifest.partitions.push(PartitionSpec {
            name: "boot".to_string(),
            payload_size: 4,
            sha1: Some("0badf00d".to_string()),
            partition_size: None,
        });

        let text = String::from_utf8(manifest.to_header_bytes().unwrap()).unwrap();
        assert!(text.starts_with(r#"{"kernelMem":"${totalmem}","setTotalMem":true"#));
        assert!(!text.contains("additionalCmdline"));
        assert!(!text.contains("skip"));
        assert!(!text.contains("partitionSize"));
        assert!(text.contains(r#""payloadSize":4"#));
    }

    #[test]
    fn test_partition_kind_order_and_capacity() {
        let mut kinds = vec![PartitionKind::Rootfs, PartitionKind::Boot, PartitionKind::Kernel];
        kinds.sort();
        assert_eq!(kinds, PartitionKind::ALL.to_vec());
        assert_eq!(PartitionKind::Boot.slot_capacity(), 0x50000);
        assert_eq!(PartitionKind::from_name("rootfs"), Some(PartitionKind::Rootfs));
        assert_eq!(PartitionKind::from_name("env"), None);
    }
}
