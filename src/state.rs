//! Shared application state for all routes.

use crate::config::Config;
use crate::rate_limit::RateLimiter;
use crate::service::ClientService;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub clients: ClientService,
    pub config: Arc<Config>,
    /// Shared by every `/api` request; keyed by client IP.
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Arc<Config>) -> Self {
        AppState {
            clients: ClientService::new(pool, &config.database_schema),
            limiter: Arc::new(RateLimiter::new(config.rate_limit_max, config.rate_limit_window)),
            config,
        }
    }

    pub fn pool(&self) -> &PgPool {
        self.clients.pool()
    }
}
