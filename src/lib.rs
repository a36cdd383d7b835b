//! fwbundle - firmware partition bundles
//!
//! Packs boot, kernel and root filesystem images into a single file behind a
//! self-describing manifest, and validates or extracts them again. Each
//! partition record carries its own length prefix and is checked against the
//! manifest's declared size and truncated SHA-1 digest.

pub mod bundle;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use errors::*;
pub use models::*;

/// fwbundle version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// fwbundle application name
pub const APP_NAME: &str = "fwbundle";
