//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::error::ErrorKind;
use thiserror::Error;

use crate::response::ErrorBody;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("secret store request for '{name}' failed: {message}")]
    Store { name: String, message: String },
    #[error("secret '{0}' not found")]
    NotFound(String),
    #[error("secret '{0}' has no string value")]
    NotText(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    /// A failure reported to the caller with a fixed message; the cause is only logged.
    #[error("{message}: {source}")]
    Failed {
        message: &'static str,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Replace internal failures with `message`. NotFound and BadRequest keep their own response.
    pub fn context(self, message: &'static str) -> AppError {
        match self {
            AppError::NotFound(_) | AppError::BadRequest(_) | AppError::Failed { .. } => self,
            other => AppError::Failed {
                message,
                source: Box::new(other),
            },
        }
    }

    /// True when the database rejected a write because of a constraint (e.g. duplicate email).
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            AppError::Db(sqlx::Error::Database(e)) => matches!(
                e.kind(),
                ErrorKind::UniqueViolation | ErrorKind::NotNullViolation | ErrorKind::CheckViolation
            ),
            AppError::Failed { source, .. } => source.is_constraint_violation(),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string()),
            AppError::Failed { message, .. } => (StatusCode::INTERNAL_SERVER_ERROR, message.to_string()),
        };
        if self.is_constraint_violation() {
            tracing::warn!(error = %self, "constraint violation");
        } else if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Process lifecycle failures; the binary exits non-zero on any of them.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Secret(#[from] SecretError),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// The server loop failed after startup, while serving or draining.
    #[error("shutdown: {0}")]
    Shutdown(#[source] std::io::Error),
}

impl ServerError {
    /// Startup failures happen before the listener accepts traffic.
    pub fn is_startup(&self) -> bool {
        !matches!(self, ServerError::Shutdown(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_wraps_internal_errors() {
        let err = AppError::Validation("email is required".into()).context("Failed to create client");
        match err {
            AppError::Failed { message, source } => {
                assert_eq!(message, "Failed to create client");
                assert!(matches!(*source, AppError::Validation(_)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn context_keeps_not_found() {
        let err = AppError::NotFound("Client not found".into()).context("Failed to update client");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn context_does_not_double_wrap() {
        let err = AppError::Validation("x".into())
            .context("Failed to update client")
            .context("other");
        match err {
            AppError::Failed { message, .. } => assert_eq!(message, "Failed to update client"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::NotFound("Client not found".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("unknown field".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Db(sqlx::Error::PoolClosed)
                .context("Failed to fetch clients")
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
