//! Bundle reader and validator
//!
//! One bounded pass over the whole bundle. Per-partition problems become
//! [`PartitionOutcome`] values and never stop the scan; structural problems
//! reject the bundle with [`BundleError::BrokenDump`].
//!
//! The cursor always advances by the length prefix read from the stream,
//! even when it disagrees with the manifest, so a single bad size in the
//! header cannot desynchronize the records that follow it.

use super::LENGTH_PREFIX_LEN;
use super::digest::short_sha1;
use super::extract::{ConcatSink, ExtractSink, PartitionSink, SummarySink};
use crate::errors::{BrokenDumpReason, BundleError, Result};
use crate::models::{ManifestDocument, PartitionOutcome, ScanReport};
use std::path::{Path, PathBuf};

/// What to do with partitions that validate
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Report only
    #[default]
    Summary,
    /// One file per partition inside `dir`
    Extract { dir: PathBuf },
    /// All partitions appended to a single image
    Concatenate { path: PathBuf },
}

/// Split a bundle into its parsed header and the offset of the first record
pub fn read_manifest(data: &[u8]) -> Result<(ManifestDocument, usize)> {
    let header_len = data
        .iter()
        .position(|&byte| byte == 0)
        .ok_or(BundleError::BrokenDump(BrokenDumpReason::MissingTerminator))?;

    let document = ManifestDocument::parse(&data[..header_len])?;
    Ok((document, header_len + 1))
}

/// Validate every record of `data`, handing good payloads to `sink`
pub fn scan<S: PartitionSink + ?Sized>(data: &[u8], sink: &mut S) -> Result<ScanReport> {
    let (document, body_offset) = read_manifest(data)?;
    scan_records(data, &document, body_offset, sink)
}

/// Validate the records following an already parsed header
pub fn scan_records<S: PartitionSink + ?Sized>(
    data: &[u8],
    document: &ManifestDocument,
    body_offset: usize,
    sink: &mut S,
) -> Result<ScanReport> {
    let mut offset = body_offset;
    let partitions = document.partitions();
    let mut outcomes = Vec::with_capacity(partitions.len());

    for (index, spec) in partitions.iter().enumerate() {
        if data.len() - offset < LENGTH_PREFIX_LEN {
            return Err(BundleError::BrokenDump(BrokenDumpReason::MissingRecords {
                consumed: index,
                declared: partitions.len(),
            }));
        }

        let mut prefix = [0u8; LENGTH_PREFIX_LEN];
        prefix.copy_from_slice(&data[offset..offset + LENGTH_PREFIX_LEN]);
        let length = u32::from_le_bytes(prefix);
        let record_start = offset;
        offset += LENGTH_PREFIX_LEN;

        let available = data.len() - offset;
        if length as usize > available {
            return Err(BundleError::BrokenDump(BrokenDumpReason::TruncatedRecord {
                name: spec.name.clone(),
                offset: record_start,
                length,
                available,
            }));
        }
        let payload = &data[offset..offset + length as usize];
        offset += length as usize;
        log::trace!(
            "Record '{}' at 0x{:x}, 0x{:x} bytes",
            spec.name,
            record_start,
            length
        );

        let actual_size = u64::from(length);
        if actual_size != spec.payload_size {
            log::warn!(
                "For '{}' expected size 0x{:x}, actual 0x{:x}, skipping",
                spec.name,
                spec.payload_size,
                actual_size
            );
            outcomes.push(PartitionOutcome::SizeMismatch {
                name: spec.name.clone(),
                expected: spec.payload_size,
                actual: actual_size,
            });
            continue;
        }

        let digest = short_sha1(payload);
        if let Some(expected) = spec.expected_digest() {
            if expected != digest {
                log::warn!(
                    "SHA1 digest of '{}' is {}, expected {}, skipping",
                    spec.name,
                    digest,
                    expected
                );
                outcomes.push(PartitionOutcome::DigestMismatch {
                    name: spec.name.clone(),
                    expected: expected.to_string(),
                    actual: digest,
                });
                continue;
            }
        }

        sink.accept(spec, payload)?;
        outcomes.push(PartitionOutcome::Ok {
            name: spec.name.clone(),
            size: actual_size,
            sha1: digest,
        });
    }

    sink.finish()?;

    if offset != data.len() {
        return Err(BundleError::BrokenDump(BrokenDumpReason::LengthMismatch {
            cursor: offset,
            total: data.len(),
        }));
    }

    Ok(ScanReport {
        shape: document.shape(),
        outcomes,
        total_bytes: data.len(),
    })
}

/// Scan an in-memory bundle in the given mode
pub fn scan_bytes(data: &[u8], mode: &ScanMode) -> Result<ScanReport> {
    match mode {
        ScanMode::Summary => scan(data, &mut SummarySink),
        ScanMode::Extract { dir } => scan(data, &mut ExtractSink::new(dir)),
        ScanMode::Concatenate { path } => {
            // The aggregate is only created once the header has parsed
            let (document, body_offset) = read_manifest(data)?;
            let mut sink = ConcatSink::create(path)?;
            scan_records(data, &document, body_offset, &mut sink)
        }
    }
}

/// Read a bundle file and scan it in the given mode
pub fn scan_file(path: &Path, mode: &ScanMode) -> Result<ScanReport> {
    let data = std::fs::read(path).map_err(|source| BundleError::MissingInputFile {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Scanning {} ({} bytes)", path.display(), data.len());
    scan_bytes(&data, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(header: &str, body: &[u8]) -> Vec<u8> {
        let mut data = header.as_bytes().to_vec();
        data.push(0);
        data.extend_from_slice(body);
        data
    }

    fn record(payload: &[u8]) -> Vec<u8> {
        let mut data = (payload.len() as u32).to_le_bytes().to_vec();
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_missing_terminator() {
        let err = scan(b"partitions: []", &mut SummarySink).unwrap_err();
        assert!(matches!(
            err,
            BundleError::BrokenDump(BrokenDumpReason::MissingTerminator)
        ));
    }

    #[test]
    fn test_empty_partition_table_is_valid() {
        let report = scan(&bundle("partitions: []", &[]), &mut SummarySink).unwrap();
        assert!(report.outcomes.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_trailing_bytes_are_broken_dump() {
        let data = bundle("partitions: []", &[0xFF]);
        let err = scan(&data, &mut SummarySink).unwrap_err();
        assert!(matches!(
            err,
            BundleError::BrokenDump(BrokenDumpReason::LengthMismatch { cursor, total })
                if total == cursor + 1
        ));
    }

    #[test]
    fn test_short_stream_reports_missing_records() {
        let header = "partitions: [{name: boot, size: 2}, {name: kernel, size: 2}]";
        let data = bundle(header, &record(b"ab"));
        let err = scan(&data, &mut SummarySink).unwrap_err();
        assert!(matches!(
            err,
            BundleError::BrokenDump(BrokenDumpReason::MissingRecords {
                consumed: 1,
                declared: 2
            })
        ));
    }

    #[test]
    fn test_length_past_end_is_truncated_record() {
        let header = "partitions: [{name: boot, size: 16}]";
        let mut body = 16u32.to_le_bytes().to_vec();
        body.extend_from_slice(b"short");
        let err = scan(&bundle(header, &body), &mut SummarySink).unwrap_err();
        assert!(matches!(
            err,
            BundleError::BrokenDump(BrokenDumpReason::TruncatedRecord { length: 16, available: 5, .. })
        ));
    }

    #[test]
    fn test_digest_mismatch_skips_sink() {
        struct Recording(Vec<String>);
        impl PartitionSink for Recording {
            fn accept(&mut self, spec: &crate::models::PartitionSpec, _: &[u8]) -> Result<()> {
                self.0.push(spec.name.clone());
                Ok(())
            }
        }

        let header = format!(
            "partitions: [{{name: boot, size: 3, sha1: '00000000'}}, {{name: kernel, size: 3, sha1: '{}'}}]",
            short_sha1(b"def")
        );
        let mut body = record(b"abc");
        body.extend(record(b"def"));

        let mut sink = Recording(Vec::new());
        let report = scan(&bundle(&header, &body), &mut sink).unwrap();

        assert_eq!(sink.0, vec!["kernel"]);
        assert_eq!(
            report.outcomes[0],
            PartitionOutcome::DigestMismatch {
                name: "boot".to_string(),
                expected: "00000000".to_string(),
                actual: short_sha1(b"abc"),
            }
        );
        assert!(report.outcomes[1].is_ok());
    }
}
