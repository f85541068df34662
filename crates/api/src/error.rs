use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use staybook_core::error::{AuthError, CoreError};

use crate::auth::store::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] / [`AuthError`] for domain errors, [`StoreError`] for
/// persistence failures, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent `{ "error", "code" }` JSON bodies.
/// Internal details are logged, never returned.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `staybook_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An authentication or authorization failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A credential store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Auth(auth) => classify_auth_error(auth),
            },

            AppError::Auth(auth) => classify_auth_error(auth),

            // --- Store errors ---
            AppError::Store(err) => classify_store_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal_error()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Map an [`AuthError`] to 401, except `Forbidden` (403) and
/// `EmailAlreadyRegistered` (409).
fn classify_auth_error(err: &AuthError) -> (StatusCode, &'static str, String) {
    let status = match err {
        AuthError::Forbidden => StatusCode::FORBIDDEN,
        AuthError::EmailAlreadyRegistered => StatusCode::CONFLICT,
        _ => StatusCode::UNAUTHORIZED,
    };
    (status, err.code(), err.to_string())
}

/// Classify a credential store error into an HTTP status, error code, and message.
///
/// - A duplicate email maps to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::DuplicateEmail => classify_auth_error(&AuthError::EmailAlreadyRegistered),
        other => {
            tracing::error!(error = %other, "Credential store error");
            internal_error()
        }
    }
}

fn internal_error() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
