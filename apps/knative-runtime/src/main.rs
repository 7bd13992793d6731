use std::collections::HashMap;

use anyhow::{Result, anyhow};
use axum::serve;
use mcf_knative_runtime::{RuntimeConfig, RuntimeState, build_router, function_by_name};
use mcf_telemetry::install as init_telemetry;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry("knative-runtime")?;

    let config = RuntimeConfig::from_env()?;
    let function = function_by_name(&config.function_name)
        .ok_or_else(|| anyhow!("unknown function {:?}", config.function_name))?;

    let env: HashMap<String, String> = std::env::vars().collect();
    function.start(&env);

    let router = build_router(RuntimeState::new(function.clone(), config.max_body_bytes));
    let listener = TcpListener::bind(config.addr).await?;
    info!(function = function.name(), "knative-runtime listening on {}", config.addr);

    serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    function.stop();
    info!("knative-runtime stopped");
    Ok(())
}
