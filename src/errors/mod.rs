//! Error types shared by the writer, reader and CLI

pub mod types;

pub use types::*;
