//! Error types for payfix-api
//!
//! Every failure is rendered as the JSON envelope
//! `{"ok": false, "error": <message>, "code": <CODE>}`; validation failures
//! carry an `errors` list instead of a single message.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use payfix_common::api::ErrorBody;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Fix rejected by field validation (400)
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Missing or rejected credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict (409), e.g. username already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// payfix-common error
    #[error("Common error: {0}")]
    Common(#[from] payfix_common::Error),
}

impl ApiError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        use payfix_common::Error as CommonError;

        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorBody::message("BAD_REQUEST", msg))
            }
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, ErrorBody::validation(errors))
            }
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorBody::message("UNAUTHORIZED", msg))
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorBody::message("NOT_FOUND", msg))
            }
            ApiError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorBody::message("CONFLICT", msg))
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::message("INTERNAL_ERROR", msg),
            ),
            ApiError::Common(err) => match err {
                CommonError::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, ErrorBody::message("NOT_FOUND", msg))
                }
                CommonError::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, ErrorBody::message("BAD_REQUEST", msg))
                }
                CommonError::Conflict(msg) => {
                    (StatusCode::CONFLICT, ErrorBody::message("CONFLICT", msg))
                }
                CommonError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, ErrorBody::message("UNAUTHORIZED", msg))
                }
                other => {
                    error!("Request failed: {}", other);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorBody::message("INTERNAL_ERROR", other.to_string()),
                    )
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
