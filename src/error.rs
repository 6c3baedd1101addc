//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Session required")]
    SessionRequired,

    #[error("Session not found or expired")]
    SessionNotFound,

    #[error("Building not found: {0}")]
    BuildingNotFound(String),

    #[error("Credit not found for player {0}")]
    CreditNotFound(String),

    #[error("Player {0} already has an active credit")]
    CreditExists(String),

    #[error("Privateer not found: {0}")]
    PrivateerNotFound(String),

    #[error("Convict not found: {0}")]
    ConvictNotFound(String),

    #[error("Catalog entry not found: {0}")]
    CatalogNotFound(String),

    #[error("Log entry not found: {0}")]
    LogEntryNotFound(uuid::Uuid),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<crate::store::StoreError> for AppError {
    fn from(err: crate::store::StoreError) -> Self {
        match err {
            crate::store::StoreError::Database(e) => AppError::Database(e),
            crate::store::StoreError::Corrupt(msg) => AppError::Internal(msg),
        }
    }
}

impl From<crate::audit::ActionLogError> for AppError {
    fn from(err: crate::audit::ActionLogError) -> Self {
        match err {
            crate::audit::ActionLogError::Database(e) => AppError::Database(e),
            crate::audit::ActionLogError::Serialization(e) => AppError::Internal(e.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // 401 Unauthorized
            AppError::SessionRequired => {
                (StatusCode::UNAUTHORIZED, "session_required", None)
            }
            AppError::SessionNotFound => {
                (StatusCode::UNAUTHORIZED, "session_not_found", None)
            }

            // 404 Not Found
            AppError::BuildingNotFound(id) => {
                (StatusCode::NOT_FOUND, "building_not_found", Some(id.clone()))
            }
            AppError::CreditNotFound(id) => {
                (StatusCode::NOT_FOUND, "credit_not_found", Some(id.clone()))
            }
            AppError::PrivateerNotFound(id) => {
                (StatusCode::NOT_FOUND, "privateer_not_found", Some(id.clone()))
            }
            AppError::ConvictNotFound(id) => {
                (StatusCode::NOT_FOUND, "convict_not_found", Some(id.clone()))
            }
            AppError::CatalogNotFound(name) => {
                (StatusCode::NOT_FOUND, "catalog_not_found", Some(name.clone()))
            }
            AppError::LogEntryNotFound(id) => {
                (StatusCode::NOT_FOUND, "log_entry_not_found", Some(id.to_string()))
            }

            // 409 Conflict
            AppError::CreditExists(id) => {
                (StatusCode::CONFLICT, "credit_exists", Some(id.clone()))
            }

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(ref domain_err) => {
                use crate::domain::DomainError;
                match domain_err {
                    DomainError::InsufficientFunds { .. } => (
                        StatusCode::BAD_REQUEST,
                        "insufficient_funds",
                        Some(domain_err.to_string()),
                    ),
                    DomainError::InvalidQuantity(_) => (
                        StatusCode::BAD_REQUEST,
                        "invalid_quantity",
                        Some(domain_err.to_string()),
                    ),
                    DomainError::InvalidAmount(_) => (
                        StatusCode::BAD_REQUEST,
                        "invalid_amount",
                        Some(domain_err.to_string()),
                    ),
                    DomainError::InvalidTerm(_) => (
                        StatusCode::BAD_REQUEST,
                        "invalid_term",
                        Some(domain_err.to_string()),
                    ),
                    DomainError::InactivePrivateer(id) => (
                        StatusCode::BAD_REQUEST,
                        "inactive_privateer",
                        Some(id.clone()),
                    ),
                }
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
