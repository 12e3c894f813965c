//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that translates every failure into
//! the wire format the API speaks: an HTTP status plus a `{"error": ...}`
//! JSON body. All route handlers return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::validate::ValidationError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Required field missing or forbidden field present.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Identifier does not resolve to a stored document.
    #[error("not found")]
    NotFound,

    /// Caller lacks the required role or ownership.
    #[error("unauthorized")]
    Unauthorized,

    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Underlying persistence operation failed.
    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture unexpected server-side failures to Sentry
        if matches!(
            self,
            Self::Repository(RepositoryError::Database(_) | RepositoryError::DataCorruption(_))
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, body) = match &self {
            Self::Validation(err) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": { "validation": err } }),
            ),
            Self::NotFound | Self::Repository(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, json!({ "error": "not found" }))
            }
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "unauthorized" })),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    json!({ "error": "invalid credentials" }),
                ),
                AuthError::UserAlreadyExists => (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "account already exists" }),
                ),
                AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
                AuthError::InvalidEmail(e) => {
                    (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() }))
                }
                AuthError::PasswordHash | AuthError::Repository(_) | AuthError::Session(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal error" }),
                ),
            },
            // Store failures surface as a generic 400 with the underlying
            // message; corruption is the one case kept opaque.
            Self::Repository(RepositoryError::Conflict(msg)) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            Self::Repository(RepositoryError::Database(e)) => {
                (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() }))
            }
            Self::Repository(RepositoryError::DataCorruption(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "internal error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::FieldRules;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status_of(AppError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(AppError::Repository(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Repository(RepositoryError::Conflict(
                "email already exists".to_owned()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_validation_maps_to_400() {
        let mut rules = FieldRules::new();
        rules.require_str("name", None);
        let err = rules.finish().expect_err("rules failed");
        assert_eq!(status_of(AppError::Validation(err)), StatusCode::BAD_REQUEST);
    }
}
