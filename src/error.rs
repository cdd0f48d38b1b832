use crate::config::ConfigError;
use crate::intake::extract::ExtractError;
use crate::mailer::MailerError;
use crate::telemetry::TelemetryError;
use axum::extract::multipart::MultipartRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Startup and serve-loop failures. Request-path failures are
/// [`IntakeError`] and never bubble up here.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Mailer(MailerError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Mailer(err) => write!(f, "mailer error: {}", err),
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
            AppError::Mailer(err) => Some(err),
        }
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

impl From<MailerError> for AppError {
    fn from(value: MailerError) -> Self {
        Self::Mailer(value)
    }
}

/// Failures while handling one `/apply` request. Every kind maps to the
/// same 500 response; callers can only distinguish them by message.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Missing RESEND_API_KEY / FROM_EMAIL / TO_EMAIL in env")]
    MissingDeliveryConfig,
    #[error("invalid multipart request: {0}")]
    Rejection(#[from] MultipartRejection),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Mailer(#[from] MailerError),
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "ok": false, "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
