//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; every error body carries the same envelope the
//! frontend expects: `{"success": false, "message": "..."}`, with
//! `attemptsLeft` added on a wrong verification code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::email::EmailError;

/// Application-level error type for the store API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Email delivery failed outside the auth flow.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Email(_) | Self::Internal(_) => true,
            Self::Auth(err) => matches!(
                err,
                AuthError::Hash | AuthError::Dispatch(_) | AuthError::Repository(_)
            ),
            Self::NotFound(_) | Self::BadRequest(_) | Self::RateLimited => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Email(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_)
                | AuthError::CodeNotFound
                | AuthError::CodeExpired
                | AuthError::TooManyAttempts
                | AuthError::WrongCode { .. } => StatusCode::BAD_REQUEST,
                AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                AuthError::Hash | AuthError::Dispatch(_) | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Server error. Please try again.".to_string(),
            Self::Email(_) => "Failed to send message. Please try again later.".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) => "Please enter a valid email address".to_string(),
                AuthError::RateLimited => "Too many requests. Please try again later.".to_string(),
                AuthError::CodeNotFound => "Invalid or expired verification code".to_string(),
                AuthError::CodeExpired => {
                    "Verification code has expired. Please request a new one.".to_string()
                }
                AuthError::TooManyAttempts => {
                    "Too many failed attempts. Please request a new code.".to_string()
                }
                AuthError::WrongCode { .. } => "Invalid verification code".to_string(),
                AuthError::Dispatch(e) => format!("Failed to send email: {e}"),
                AuthError::Hash | AuthError::Repository(_) => {
                    "Server error. Please try again.".to_string()
                }
            },
            Self::RateLimited => "Too many requests. Please try again later.".to_string(),
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
        };

        let mut body = json!({
            "success": false,
            "message": message,
        });
        if let Self::Auth(AuthError::WrongCode { attempts_left }) = &self {
            body["attemptsLeft"] = json!(attempts_left);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product not found".to_string());
        assert_eq!(err.to_string(), "Not found: Product not found");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::RateLimited)),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::WrongCode { attempts_left: 2 })),
            StatusCode::BAD_REQUEST
        );
    }
}
