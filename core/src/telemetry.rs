//! Tracing setup shared by the service binaries.
//!
//! `RUST_LOG` takes precedence; otherwise the filter is `info`, or `debug`
//! when debug logging was requested.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// Fails instead of panicking when a subscriber is already installed.
pub fn init_tracing(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
