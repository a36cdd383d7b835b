//! Logging utilities and initialization for fwbundle

use anyhow::Result;
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Map `-q` / `-v` flags to a level filter
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Initialize logging for the fwbundle CLI
pub fn init_cli_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = level_for(verbose, quiet);

    Builder::from_default_env()
        .target(Target::Stderr)
        .filter_level(level)
        .format_timestamp_secs()
        .format_module_path(false)
        .try_init()?;

    // Initialize panic logging
    #[cfg(debug_assertions)]
    log_panics::init();

    log::debug!("fwbundle logging initialized with level: {:?}", level);
    Ok(())
}
