use std::sync::OnceLock;

use anyhow::Result;
use tracing_subscriber::layer::Layer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, TelemetryConfig};

static INIT: OnceLock<TelemetryConfig> = OnceLock::new();

/// Installs a `fmt` subscriber filtered by `cfg.filter` (default `info`).
///
/// Only the first call installs anything. A subscriber set elsewhere, e.g. by a
/// test harness, is left in place.
pub fn init_telemetry(cfg: TelemetryConfig) -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let fmt_layer = match cfg.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
    };

    let (env_filter, rejected) = build_filter(cfg.filter.as_deref());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .ok();

    tracing::info!(
        service.name = %cfg.service_name,
        service.version = %cfg.service_version,
        deployment.environment = %cfg.environment,
        "telemetry initialised"
    );
    if let Some(err) = rejected {
        tracing::warn!(error = %err, "invalid RUST_LOG directives, falling back to info");
    }
    INIT.set(cfg).ok();
    Ok(())
}

/// Filter for `directives`, or `info` plus the parse error when they are invalid.
fn build_filter(directives: Option<&str>) -> (EnvFilter, Option<String>) {
    match directives.map(EnvFilter::try_new) {
        Some(Ok(filter)) => (filter, None),
        Some(Err(err)) => (EnvFilter::new("info"), Some(err.to_string())),
        None => (EnvFilter::new("info"), None),
    }
}

/// Plain-text logging on stderr for command-line tools, keeping stdout for output.
/// `RUST_LOG` wins over the default level (`debug` when verbose, `warn` otherwise).
pub fn init_cli_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init()
        .ok();
}

/// Configuration of the installed subscriber, if any.
pub fn telemetry_installed() -> Option<&'static TelemetryConfig> {
    INIT.get()
}
