//! Process lifecycle: resolve secrets, connect, sync schema, serve, drain.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use crate::config::{Config, Mode};
use crate::error::ServerError;
use crate::routes::app;
use crate::secrets::{resolve_database_url, AwsSecretStore, SecretStore};
use crate::state::AppState;
use crate::store;

/// Run until a termination signal arrives and in-flight requests finish.
pub async fn run(config: Config) -> Result<(), ServerError> {
    let config = Arc::new(config);

    let aws = match config.mode {
        Mode::Production => Some(AwsSecretStore::from_env(config.secret_region.clone()).await),
        Mode::Development => None,
    };
    let database_url = resolve_database_url(&config, aws.as_ref().map(|s| s as &dyn SecretStore)).await?;

    tracing::info!(max_connections = config.db_max_connections, "connecting to database");
    let pool = store::connect(&database_url, &config).await?;
    store::ensure_schema(&pool, &config.database_schema).await?;

    let listener = TcpListener::bind(config.bind_addr()?).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    let state = AppState::new(pool.clone(), config);
    let served = serve(listener, state, shutdown_signal()).await;

    tracing::info!("closing database pool");
    pool.close().await;
    served.map_err(ServerError::Shutdown)?;
    tracing::info!("shutdown complete");
    Ok(())
}

/// Serve on `listener` until `shutdown` resolves, then wait for in-flight requests.
/// Stale rate-limit entries are pruned once per window while serving.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let limiter = state.limiter.clone();
    let cleanup = tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window());
        interval.tick().await;
        loop {
            interval.tick().await;
            limiter.cleanup();
            tracing::debug!(tracked_ips = limiter.tracked_ips(), "rate limit entries pruned");
        }
    });

    let result = axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await;
    cleanup.abort();
    result
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::warn!("received Ctrl+C, draining");
        }
        _ = terminate => {
            tracing::warn!("received SIGTERM, draining");
        }
    }
}
