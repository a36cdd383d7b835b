//! Custom error types for bundle operations

use std::fmt;
use std::path::PathBuf;

/// Why a bundle was rejected as a whole
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokenDumpReason {
    /// No NUL byte terminates the manifest header
    MissingTerminator,
    /// A length prefix points past the end of the stream
    TruncatedRecord {
        name: String,
        offset: usize,
        length: u32,
        available: usize,
    },
    /// Fewer records than the manifest declares
    MissingRecords { consumed: usize, declared: usize },
    /// The scan finished away from the end of the stream
    LengthMismatch { cursor: usize, total: usize },
}

impl fmt::Display for BrokenDumpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokenDumpReason::MissingTerminator => {
                write!(f, "manifest header is not NUL-terminated")
            }
            BrokenDumpReason::TruncatedRecord {
                name,
                offset,
                length,
                available,
            } => write!(
                f,
                "record '{}' at offset 0x{:x} declares 0x{:x} bytes but only 0x{:x} remain",
                name, offset, length, available
            ),
            BrokenDumpReason::MissingRecords { consumed, declared } => write!(
                f,
                "stream ended after {} of {} declared partitions",
                consumed, declared
            ),
            BrokenDumpReason::LengthMismatch { cursor, total } => write!(
                f,
                "scan ended at offset 0x{:x} but stream is 0x{:x} bytes long",
                cursor, total
            ),
        }
    }
}

/// Main error type for bundle operations
#[derive(Debug)]
pub enum BundleError {
    /// Manifest header is not a valid document
    ManifestParse(String),
    /// Whole-bundle structural failure
    BrokenDump(BrokenDumpReason),
    /// Payload does not fit its fixed slot
    Oversize {
        name: String,
        size: u64,
        capacity: u64,
    },
    /// A partition source file could not be read
    MissingInputFile {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The bundle or an extracted partition could not be written
    WriteIo {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Configuration errors
    Config(String),
    /// General I/O errors
    Io(std::io::Error),
    /// Serialization errors
    Serialization(String),
}

impl BundleError {
    /// True for errors that reject a bundle as malformed rather than an I/O failure
    pub fn is_broken_dump(&self) -> bool {
        matches!(self, BundleError::BrokenDump(_))
    }
}

impl fmt::Display for BundleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleError::ManifestParse(msg) => write!(f, "Manifest parse error: {}", msg),
            BundleError::BrokenDump(reason) => write!(f, "Broken dump: {}", reason),
            BundleError::Oversize {
                name,
                size,
                capacity,
            } => write!(
                f,
                "Partition '{}' is 0x{:x} bytes, exceeding its 0x{:x} byte slot",
                name, size, capacity
            ),
            BundleError::MissingInputFile { path, source } => {
                write!(f, "Cannot read input '{}': {}", path.display(), source)
            }
            BundleError::WriteIo { path, source } => {
                write!(f, "Cannot write '{}': {}", path.display(), source)
            }
            BundleError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BundleError::Io(err) => write!(f, "I/O error: {}", err),
            BundleError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for BundleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BundleError::MissingInputFile { source, .. } => Some(source),
            BundleError::WriteIo { source, .. } => Some(source),
            BundleError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BundleError {
    fn from(err: std::io::Error) -> Self {
        BundleError::Io(err)
    }
}

impl From<serde_json::Error> for BundleError {
    fn from(err: serde_json::Error) -> Self {
        BundleError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for BundleError {
    fn from(err: serde_yaml::Error) -> Self {
        BundleError::ManifestParse(err.to_string())
    }
}

impl From<toml::de::Error> for BundleError {
    fn from(err: toml::de::Error) -> Self {
        BundleError::Config(err.to_string())
    }
}

/// Result type alias for bundle operations
pub type Result<T> = std::result::Result<T, BundleError>;
