//! Logging setup.
//!
//! Installs a `tracing` fmt subscriber filtered to the kestrel crates at the
//! configured level. Installation is idempotent: a second call (for example
//! from another test in the same process) leaves the first subscriber in
//! place and reports `false`.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Builds the filter directive for the configured level.
#[must_use]
pub fn filter_directive(config: &LoggingConfig) -> String {
    let level = config.level.to_ascii_lowercase();
    format!("kestrel_common={level},kestrel_sql={level},kestrel_test={level}")
}

/// Installs the global subscriber. Returns true if this call installed it.
pub fn init(config: &LoggingConfig) -> bool {
    let filter =
        EnvFilter::try_new(filter_directive(config)).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .is_ok()
}
