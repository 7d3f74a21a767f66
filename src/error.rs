//! # Error Handling
//!
//! Server-side error type and its conversion into HTTP responses.
//! Handlers return `AppResult<T>`; the `?` operator converts library errors
//! through the `#[from]` attributes below.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database errors (SQLx library errors)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// WebAuthn protocol errors
    ///
    /// Common causes: invalid signature, mismatched challenge or origin,
    /// a credential that is already registered
    #[error("WebAuthn error: {0}")]
    WebAuthn(#[from] webauthn_rs::prelude::WebauthnError),

    /// Stored ceremony state or passkeys could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 404: unknown user, no passkeys, no pending challenge
    #[error("Not found: {0}")]
    NotFound(String),

    /// 400: malformed or invalid request data
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 401: no session, or the pending challenge expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 500: anything unexpected
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Maps each variant to a status code and a user-facing message.
///
/// Details of database, WebAuthn and serialization failures are logged but
/// never sent to the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::WebAuthn(e) => {
                tracing::error!("WebAuthn error: {:?}", e);
                (StatusCode::BAD_REQUEST, "Authentication error".to_string())
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Serialization error".to_string())
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        // Format: { "error": "error message here" }
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_variant() {
        let cases = [
            (AppError::NotFound("user".into()), StatusCode::NOT_FOUND),
            (AppError::BadRequest("name".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("expired".into()), StatusCode::UNAUTHORIZED),
            (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
