//! Bundle writer
//!
//! Builds a manifest from partition images and serializes it followed by a
//! NUL byte and one length-prefixed record per partition:
//!
//! ```text
//! manifest JSON | 0x00 | (u32 LE length, payload)*
//! ```

use super::digest::short_sha1;
use super::LENGTH_PREFIX_LEN;
use crate::config::ManifestDefaults;
use crate::errors::{BundleError, Result};
use crate::models::{Manifest, PartitionKind, PartitionSpec};
use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// How partition payloads are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Packing {
    /// Each payload must fit its well-known slot; `partitionSize` is recorded
    #[default]
    FixedSlot,
    /// No slot bounds check and no `partitionSize`
    Tight,
}

/// Partition image files supplied on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionSources {
    pub boot: Option<PathBuf>,
    pub kernel: Option<PathBuf>,
    pub rootfs: Option<PathBuf>,
}

impl PartitionSources {
    /// Supplied sources in bundle order
    pub fn iter(&self) -> impl Iterator<Item = (PartitionKind, &Path)> {
        [
            (PartitionKind::Boot, self.boot.as_deref()),
            (PartitionKind::Kernel, self.kernel.as_deref()),
            (PartitionKind::Rootfs, self.rootfs.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, path)| path.map(|path| (kind, path)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Assemble the extra kernel command line, `None` when nothing is requested
pub fn additional_cmdline(init: bool, cma: &str) -> Option<String> {
    let mut parts = Vec::new();
    if init {
        parts.push("init=/init");
    }
    if !cma.is_empty() {
        parts.push(cma);
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Locally scoped manifest builder
#[derive(Debug, Clone)]
pub struct BundleBuilder {
    defaults: ManifestDefaults,
    packing: Packing,
    init: bool,
    cma: String,
    partitions: BTreeMap<PartitionKind, Vec<u8>>,
}

impl BundleBuilder {
    pub fn new(defaults: ManifestDefaults) -> Self {
        Self {
            defaults,
            packing: Packing::default(),
            init: false,
            cma: String::new(),
            partitions: BTreeMap::new(),
        }
    }

    pub fn packing(mut self, packing: Packing) -> Self {
        self.packing = packing;
        self
    }

    /// Request `init=/init` on the kernel command line
    pub fn init(mut self, init: bool) -> Self {
        self.init = init;
        self
    }

    /// CMA allocator parameters passed through to the kernel
    pub fn cma(mut self, cma: impl Into<String>) -> Self {
        self.cma = cma.into();
        self
    }

    /// Add or replace a partition payload
    pub fn partition(mut self, kind: PartitionKind, data: Vec<u8>) -> Self {
        self.partitions.insert(kind, data);
        self
    }

    /// Read every supplied source file into the builder
    pub fn load_sources(mut self, sources: &PartitionSources) -> Result<Self> {
        for (kind, path) in sources.iter() {
            let data = std::fs::read(path).map_err(|source| BundleError::MissingInputFile {
                path: path.to_path_buf(),
                source,
            })?;
            log::debug!(
                "Read {} image {} ({} bytes)",
                kind,
                path.display(),
                data.len()
            );
            self.partitions.insert(kind, data);
        }
        Ok(self)
    }

    /// Validate payloads and produce the manifest and ordered payloads
    pub fn build(self) -> Result<BuiltBundle> {
        let mut manifest = Manifest::from_defaults(&self.defaults);
        let mut payloads = Vec::with_capacity(self.partitions.len());

        for (kind, data) in self.partitions {
            let size = data.len() as u64;
            if size > u64::from(u32::MAX) {
                return Err(BundleError::Oversize {
                    name: kind.name().to_string(),
                    size,
                    capacity: u64::from(u32::MAX),
                });
            }

            let partition_size = match self.packing {
                Packing::FixedSlot => {
                    let capacity = kind.slot_capacity();
                    if size > capacity {
                        return Err(BundleError::Oversize {
                            name: kind.name().to_string(),
                            size,
                            capacity,
                        });
                    }
                    Some(capacity)
                }
                Packing::Tight => None,
            };

            let sha1 = short_sha1(&data);
            log::info!("Packing {} 0x{:x} bytes sha1 {}", kind, size, sha1);
            manifest.partitions.push(PartitionSpec {
                name: kind.name().to_string(),
                payload_size: size,
                sha1: Some(sha1),
                partition_size,
            });
            payloads.push(data);
        }

        manifest.additional_cmdline = additional_cmdline(self.init, &self.cma);
        if manifest.partitions.iter().all(|p| p.name != PartitionKind::Boot.name()) {
            manifest.skip = Some(vec!["boot".to_string(), "env".to_string()]);
        }

        Ok(BuiltBundle { manifest, payloads })
    }
}

/// A validated manifest with its payloads, ready to serialize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltBundle {
    pub manifest: Manifest,
    payloads: Vec<Vec<u8>>,
}

impl BuiltBundle {
    pub fn payloads(&self) -> &[Vec<u8>] {
        &self.payloads
    }

    /// Stream the wire format into `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.manifest.to_header_bytes()?)?;
        writer.write_all(&[0])?;
        for payload in &self.payloads {
            // build() guarantees every payload fits in u32
            let length = payload.len() as u32;
            writer.write_all(&length.to_le_bytes())?;
            writer.write_all(payload)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let header_len = self.manifest.to_header_bytes()?.len() + 1;
        let records_len = self
            .payloads
            .iter()
            .map(|payload| payload.len() + LENGTH_PREFIX_LEN)
            .sum::<usize>();
        let mut bytes = Vec::with_capacity(header_len + records_len);
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Write the bundle to `path`; nothing is left behind on failure
    pub fn save(&self, path: &Path) -> Result<()> {
        let write_err = |source: std::io::Error| BundleError::WriteIo {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // 0666 before umask, like a plainly created file
        let mut staging = tempfile::Builder::new();
        staging.prefix(".fwbundle");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staging.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let mut staged = staging.tempfile_in(dir).map_err(write_err)?;

        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            self.write_to(&mut writer).map_err(|e| match e {
                BundleError::Io(source) => write_err(source),
                other => other,
            })?;
            writer.flush().map_err(write_err)?;
        }
        staged.as_file().sync_all().map_err(write_err)?;
        staged.persist(path).map_err(|e| write_err(e.error))?;

        log::info!("Wrote bundle {}", path.display());
        Ok(())
    }
}

/// Build a bundle from source files and write it to `output`
pub fn write_bundle(
    sources: &PartitionSources,
    builder: BundleBuilder,
    output: &Path,
) -> Result<Manifest> {
    let bundle = builder.load_sources(sources)?.build()?;
    bundle.save(output)?;
    Ok(bundle.manifest)
}
