//! Logging setup.
//!
//! Logs go to stderr so command replies on stdout stay readable. `RUST_LOG`
//! takes precedence over the configured filter.

use anyhow::{Context, Result};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub fn init(default_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .with_context(|| format!("Invalid log filter '{default_filter}'"))?,
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(default_filter, "logging initialized");
    Ok(())
}
