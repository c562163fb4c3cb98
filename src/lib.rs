//! Client registry: REST CRUD service for client contact records on PostgreSQL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod rate_limit;
pub mod response;
pub mod routes;
pub mod secrets;
pub mod server;
pub mod service;
pub mod state;
pub mod store;

pub use config::{Config, Mode};
pub use error::{AppError, ConfigError, SecretError, ServerError};
pub use model::{Client, ClientFields, NewClient};
pub use rate_limit::RateLimiter;
pub use routes::{app, client_routes, common_routes};
pub use secrets::{resolve_database_url, AwsSecretStore, SecretStore};
pub use service::{ClientPage, ClientService, Pagination};
pub use state::AppState;
pub use store::{connectivity_check, ensure_schema};
