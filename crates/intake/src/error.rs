use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::admissions::SendError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Database(sqlx::Error),
    Notification(SendError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "invalid configuration: {err}"),
            AppError::Telemetry(err) => write!(f, "could not start logging: {err}"),
            AppError::Io(err) => write!(f, "i/o failure: {err}"),
            AppError::Server(err) => write!(f, "http server failure: {err}"),
            AppError::Database(err) => write!(f, "pre-enrollment database failure: {err}"),
            AppError::Notification(err) => write!(f, "applicant notification failed: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Database(err) => Some(err),
            AppError::Notification(err) => Some(err),
        }
    }
}

impl AppError {
    /// HTTP status reported when the error reaches a handler boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Notification(SendError::Rejected { .. } | SendError::Transport(_)) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Notification(SendError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        Self::Database(value)
    }
}

impl From<SendError> for AppError {
    fn from(value: SendError) -> Self {
        Self::Notification(value)
    }
}
