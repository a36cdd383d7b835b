//! Firmware bundle container
//!
//! A bundle is a manifest header, a NUL byte, and one record per partition.
//! Each record is a little-endian `u32` length followed by that many bytes.

pub mod digest;
pub mod extract;
pub mod reader;
pub mod writer;

/// Size of the length prefix in front of every record
pub const LENGTH_PREFIX_LEN: usize = 4;

// Re-export commonly used types
pub use digest::short_sha1;
pub use extract::{ConcatSink, ExtractSink, PartitionSink, SummarySink};
pub use reader::{ScanMode, read_manifest, scan, scan_bytes, scan_file, scan_records};
pub use writer::{BuiltBundle, BundleBuilder, Packing, PartitionSources, write_bundle};
