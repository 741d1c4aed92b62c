//! Subscriber setup for the binary

use crate::cli::LogFormat;
use anyhow::{anyhow, Context, Result};
use std::io;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to stderr
///
/// # Errors
/// Returns an error for an unknown level or if a subscriber is already set
pub fn init(level: &str, format: LogFormat) -> Result<()> {
    let default_level: LevelFilter = level
        .parse()
        .with_context(|| format!("invalid log level: {level}"))?;
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true);

    match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    }
    .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}
