//! Logging setup for multicloud function runtimes.
//!
//! Every binary calls [`install`] once at startup; later calls are no-ops.

use anyhow::Result;

mod config;
mod tracing_init;

pub use config::{LogFormat, TelemetryConfig};
pub use tracing_init::{init_cli_logging, init_telemetry, telemetry_installed};

/// Installs the global subscriber configured from the process environment.
pub fn install(service_name: &str) -> Result<()> {
    init_telemetry(TelemetryConfig::from_env(
        service_name,
        env!("CARGO_PKG_VERSION"),
    ))
}
