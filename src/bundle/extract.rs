//! Destinations for validated partition payloads
//!
//! The reader hands every partition that passed its size and digest checks to
//! a [`PartitionSink`]. A crash in the middle of a write leaves a truncated
//! file behind; nothing here tries to recover from that.

use crate::errors::{BundleError, Result};
use crate::models::PartitionSpec;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Receives validated payloads in manifest order
pub trait PartitionSink {
    fn accept(&mut self, spec: &PartitionSpec, payload: &[u8]) -> Result<()>;

    /// Called once after the last record
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Report-only mode; payloads are dropped
#[derive(Debug, Default)]
pub struct SummarySink;

impl PartitionSink for SummarySink {
    fn accept(&mut self, spec: &PartitionSpec, payload: &[u8]) -> Result<()> {
        log::debug!("Validated {} ({} bytes)", spec.name, payload.len());
        Ok(())
    }
}

/// Writes each validated partition to its own file named after the partition
#[derive(Debug)]
pub struct ExtractSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl ExtractSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Files written so far, in manifest order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn target(&self, name: &str) -> Result<PathBuf> {
        let plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0']);
        if !plain {
            return Err(BundleError::WriteIo {
                path: self.dir.join(name),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "partition name is not a plain file name",
                ),
            });
        }
        Ok(self.dir.join(name))
    }
}

impl PartitionSink for ExtractSink {
    fn accept(&mut self, spec: &PartitionSpec, payload: &[u8]) -> Result<()> {
        let path = self.target(&spec.name)?;
        log::debug!("Writing {} to {}", spec.name, path.display());
        std::fs::write(&path, payload).map_err(|source| BundleError::WriteIo {
            path: path.clone(),
            source,
        })?;
        self.written.push(path);
        Ok(())
    }
}

/// Appends every validated partition to one aggregate image
#[derive(Debug)]
pub struct ConcatSink {
    path: PathBuf,
    writer: BufWriter<File>,
    bytes_written: u64,
}

impl ConcatSink {
    /// Create (or truncate) the aggregate file
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| BundleError::WriteIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            bytes_written: 0,
        })
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    fn write_err(&self, source: std::io::Error) -> BundleError {
        BundleError::WriteIo {
            path: self.path.clone(),
            source,
        }
    }
}

impl PartitionSink for ConcatSink {
    fn accept(&mut self, spec: &PartitionSpec, payload: &[u8]) -> Result<()> {
        log::debug!("Appending {} to {}", spec.name, self.path.display());
        if let Err(source) = self.writer.write_all(payload) {
            return Err(self.write_err(source));
        }
        self.bytes_written += payload.len() as u64;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Err(source) = self.writer.flush() {
            return Err(self.write_err(source));
        }
        log::info!(
            "Wrote {} bytes to {}",
            self.bytes_written,
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spec(name: &str, size: u64) -> PartitionSpec {
        PartitionSpec {
            name: name.to_string(),
            payload_size: size,
            sha1: None,
            partition_size: None,
        }
    }

    #[test]
    fn test_extract_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("kernel"), b"stale contents").unwrap();

        let mut sink = ExtractSink::new(temp_dir.path());
        sink.accept(&spec("kernel", 3), b"new").unwrap();

        assert_eq!(std::fs::read(temp_dir.path().join("kernel")).unwrap(), b"new");
        assert_eq!(sink.written(), &[temp_dir.path().join("kernel")]);
    }

    #[test]
    fn test_extract_rejects_path_like_names() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = ExtractSink::new(temp_dir.path());

        for name in ["../escape", "a/b", "..", ""] {
            let err = sink.accept(&spec(name, 1), b"x").unwrap_err();
            assert!(matches!(err, BundleError::WriteIo { .. }), "{name}");
        }
        assert!(sink.written().is_empty());
    }

    #[test]
    fn test_concat_appends_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ff.img");

        let mut sink = ConcatSink::create(&path).unwrap();
        sink.accept(&spec("boot", 2), b"ab").unwrap();
        sink.accept(&spec("kernel", 3), b"cde").unwrap();
        sink.finish().unwrap();

        assert_eq!(sink.bytes_written(), 5);
        assert_eq!(std::fs::read(&path).unwrap(), b"abcde");
    }
}
