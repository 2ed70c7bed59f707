//! Console logging using env_logger
//!
//! Logs go to stderr so the artifact on stdout stays machine-readable.
//! `RUST_LOG` selects the level (default: warn); `--verbose` forces debug.

use log::LevelFilter;

/// Initialize logging
pub fn init(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }

    builder.format_timestamp_millis().init();
}
