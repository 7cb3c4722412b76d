//! Error types for Secretden
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.
//!
//! Authentication failures are not represented here: bad credentials and
//! missing sessions are user-facing redirect flows handled in the auth
//! layer, never 5xx responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Registration attempted with an email that is already taken (409)
    #[error("Email already registered")]
    DuplicateEmail,

    /// OAuth provider returned a profile we cannot map to a user (400)
    #[error("Invalid provider profile: {0}")]
    InvalidProfile(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP client error talking to the OAuth provider (502)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Pages are HTML, so error bodies are plain text. Store and internal
    /// failures deliberately collapse to a generic message.
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::DuplicateEmail => (StatusCode::CONFLICT, self.to_string()),
            AppError::InvalidProfile(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::HttpClient(_) => (
                StatusCode::BAD_GATEWAY,
                "Upstream provider error".to_string(),
            ),
            AppError::Database(error) => {
                tracing::error!(%error, "Database error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Config(msg) => {
                tracing::error!(message = %msg, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Internal(error) => {
                tracing::error!(%error, "Internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
