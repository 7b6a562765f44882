use crate::models::IncidentStatus;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the incident service
#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown incident id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Lifecycle rule violated
    #[error("Illegal transition: {from} -> {to} not allowed")]
    IllegalTransition {
        from: IncidentStatus,
        to: IncidentStatus,
    },

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Advisory call failed or returned an unusable payload
    #[error("Advisory service unavailable: {0}")]
    AdvisoryUnavailable(String),

    /// Request rejected by input validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation disabled by server policy
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid or unusable configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Record or payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Unexpected failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status returned for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::IllegalTransition { .. } => StatusCode::CONFLICT,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::AdvisoryUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub fn error_code(&self) -> &str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::AdvisoryUnavailable(_) => "ADVISORY_UNAVAILABLE",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Errors render as `{"error": {code, message, status}}`
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = status.as_u16(),
                message = %message,
                "Request error"
            );
        } else {
            tracing::debug!(
                error_code = error_code,
                status_code = status.as_u16(),
                message = %message,
                "Request rejected"
            );
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Service-wide result
pub type Result<T> = std::result::Result<T, AppError>;
