//! Utility functions and helpers used throughout fwbundle

pub mod logging;
