//! Runtime configuration, read once from the environment at startup.
//!
//! `main` loads an optional `.env` file with `dotenvy` before calling [`Config::from_env`].
//! The resulting struct is shared through `AppState`; nothing else reads the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Deployment mode. Production resolves the database URL from the secret store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Development,
    Production,
}

impl std::str::FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Mode::Production),
            "development" | "dev" | "test" | "local" => Ok(Mode::Development),
            _ => Err(ConfigError::Invalid {
                key: "APP_ENV",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub mode: Mode,
    /// Direct connection string; used outside production.
    pub database_url: Option<String>,
    /// Prefix of the secret path in production (`<project>/<secret name>`).
    pub secret_project_id: Option<String>,
    pub db_secret_name: String,
    pub secret_region: Option<String>,
    /// PostgreSQL schema holding the clients table. Must be a plain identifier.
    pub database_schema: String,
    pub db_max_connections: u32,
    /// Upper bound on waiting for a pooled connection; also bounds the health probe.
    pub db_acquire_timeout: Duration,
    pub host: String,
    pub port: u16,
    pub public_dir: PathBuf,
    /// External host allowed for styles and fonts in the CSP.
    pub asset_host: String,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
    /// Take the client IP from the first `X-Forwarded-For` hop.
    pub trust_proxy: bool,
    pub max_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: Mode::Development,
            database_url: None,
            secret_project_id: None,
            db_secret_name: "database-url".into(),
            secret_region: None,
            database_schema: "public".into(),
            db_max_connections: 5,
            db_acquire_timeout: Duration::from_secs(3),
            host: "0.0.0.0".into(),
            port: 8080,
            public_dir: PathBuf::from("public"),
            asset_host: "https://cdn.jsdelivr.net".into(),
            rate_limit_max: 100,
            rate_limit_window: Duration::from_secs(15 * 60),
            trust_proxy: false,
            max_page_size: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Config::default();

        if let Some(v) = get("APP_ENV") {
            config.mode = v.parse()?;
        }
        config.database_url = get("DATABASE_URL");
        config.secret_project_id = get("SECRET_PROJECT_ID");
        if let Some(v) = get("DB_SECRET_NAME") {
            config.db_secret_name = v;
        }
        config.secret_region = get("SECRET_REGION");
        if let Some(v) = get("DATABASE_SCHEMA") {
            if !is_identifier(&v) {
                return Err(ConfigError::Invalid {
                    key: "DATABASE_SCHEMA",
                    value: v,
                });
            }
            config.database_schema = v;
        }
        if let Some(v) = get("DB_MAX_CONNECTIONS") {
            config.db_max_connections = parse_positive("DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = get("DB_ACQUIRE_TIMEOUT_SECS") {
            let secs = parse_positive("DB_ACQUIRE_TIMEOUT_SECS", &v)?;
            config.db_acquire_timeout = Duration::from_secs(u64::from(secs));
        }
        if let Some(v) = get("HOST") {
            config.host = v;
        }
        if let Some(v) = get("PORT") {
            config.port = v.parse().map_err(|_| ConfigError::Invalid { key: "PORT", value: v })?;
        }
        if let Some(v) = get("PUBLIC_DIR") {
            config.public_dir = PathBuf::from(v);
        }
        if let Some(v) = get("ASSET_HOST") {
            config.asset_host = v;
        }
        if let Some(v) = get("RATE_LIMIT_MAX") {
            config.rate_limit_max = parse_positive("RATE_LIMIT_MAX", &v)?;
        }
        if let Some(v) = get("RATE_LIMIT_WINDOW_SECS") {
            let secs = parse_positive("RATE_LIMIT_WINDOW_SECS", &v)?;
            config.rate_limit_window = Duration::from_secs(u64::from(secs));
        }
        if let Some(v) = get("TRUST_PROXY") {
            config.trust_proxy = parse_bool("TRUST_PROXY", &v)?;
        }
        if let Some(v) = get("MAX_PAGE_SIZE") {
            config.max_page_size = parse_positive("MAX_PAGE_SIZE", &v)?;
        }

        match config.mode {
            Mode::Production if config.secret_project_id.is_none() => {
                return Err(ConfigError::Missing("SECRET_PROJECT_ID"))
            }
            Mode::Development if config.database_url.is_none() => return Err(ConfigError::Missing("DATABASE_URL")),
            _ => {}
        }
        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                key: "HOST",
                value: self.host.clone(),
            })
    }
}

fn parse_positive(key: &'static str, v: &str) -> Result<u32, ConfigError> {
    v.parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ConfigError::Invalid {
            key,
            value: v.to_string(),
        })
}

fn parse_bool(key: &'static str, v: &str) -> Result<bool, ConfigError> {
    match v.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: v.to_string(),
        }),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
