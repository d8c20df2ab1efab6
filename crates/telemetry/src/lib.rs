//! Tracing pipeline bootstrap. Format is driven by settings, filtering by
//! `RUST_LOG` with an `info` fallback.

use anyhow::anyhow;
use libris_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Callable once per process; a second call
/// fails because the subscriber slot is already taken.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init(),
    };

    result.map_err(|err| anyhow!("failed to initialize tracing: {err}"))?;

    tracing::info!(format = ?settings.log_format, "telemetry initialized");

    Ok(())
}
