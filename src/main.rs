//! client-registry server: loads `.env`, reads config from the environment, and runs until SIGTERM.

use std::process::ExitCode;

use client_registry::{server, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("client_registry=info,tower_http=info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(mode = ?config.mode, "starting");

    match server::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_startup() => {
            tracing::error!(error = %e, "startup failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "shutdown failed");
            ExitCode::FAILURE
        }
    }
}
