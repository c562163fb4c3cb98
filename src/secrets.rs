//! Database URL resolution. Production reads it from a secret store; other modes use `DATABASE_URL`.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_secretsmanager::Client as SecretsManagerClient;

use crate::config::{Config, Mode};
use crate::error::{ConfigError, SecretError, ServerError};

/// A keyed secret service returning the current version of a named secret.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn latest(&self, name: &str) -> Result<String, SecretError>;
}

/// AWS Secrets Manager; `latest` reads the `AWSCURRENT` stage.
pub struct AwsSecretStore {
    client: SecretsManagerClient,
}

impl AwsSecretStore {
    /// Load credentials and region from the default provider chain; `region` overrides the region.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = loader.load().await;
        AwsSecretStore {
            client: SecretsManagerClient::new(&sdk_config),
        }
    }
}

#[async_trait]
impl SecretStore for AwsSecretStore {
    async fn latest(&self, name: &str) -> Result<String, SecretError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_resource_not_found_exception() {
                    SecretError::NotFound(name.to_string())
                } else {
                    SecretError::Store {
                        name: name.to_string(),
                        message: service_error.to_string(),
                    }
                }
            })?;
        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| SecretError::NotText(name.to_string()))
    }
}

/// Full secret path: `<project>/<secret name>`.
pub fn secret_path(project: &str, name: &str) -> String {
    format!("{}/{}", project.trim_end_matches('/'), name)
}

/// Return the database connection string for this deployment.
/// Only production touches `store`; any failure there is fatal to startup.
pub async fn resolve_database_url(config: &Config, store: Option<&dyn SecretStore>) -> Result<String, ServerError> {
    match config.mode {
        Mode::Production => {
            let project = config
                .secret_project_id
                .as_deref()
                .ok_or(ConfigError::Missing("SECRET_PROJECT_ID"))?;
            let path = secret_path(project, &config.db_secret_name);
            let store = store.ok_or_else(|| SecretError::Store {
                name: path.clone(),
                message: "no secret store configured".into(),
            })?;
            tracing::info!(secret = %path, "fetching database url from secret store");
            let value = store.latest(&path).await?;
            let value = value.trim().to_string();
            if value.is_empty() {
                return Err(SecretError::NotText(path).into());
            }
            Ok(value)
        }
        Mode::Development => {
            tracing::info!("development mode, using DATABASE_URL");
            config
                .database_url
                .clone()
                .ok_or_else(|| ConfigError::Missing("DATABASE_URL").into())
        }
    }
}
