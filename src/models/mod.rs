//! Data models for bundle headers and scan results

pub mod manifest;
pub mod report;

// Re-export commonly used types
pub use manifest::*;
pub use report::*;
