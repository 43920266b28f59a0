//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Maps every failure category of the admin plane onto one JSON error shape
//! with a stable `code`, so clients can tell bad credentials, expired
//! sessions, forbidden actions, and unreachable nodes apart without parsing
//! messages.
//!
//! # Key invariants and assumptions
//! - `status` always agrees with `body.code`.
//! - Auth failures carry no detail beyond their category.
//!
//! # Security considerations
//! - Store and transport details are logged server-side only; responses carry
//!   a generic message.
use crate::api::types::ErrorResponse;
use crate::audit::DispatchError;
use crate::store::StoreError;
use axum::Json;
use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use cadence_authz::AuthError;

/// Structured API error returned by handlers.
///
/// # Example
/// ```rust
/// use admin::api::error::api_forbidden;
/// use axum::http::StatusCode;
///
/// let err = api_forbidden("not allowed");
/// assert_eq!(err.status, StatusCode::FORBIDDEN);
/// assert_eq!(err.body.code, "forbidden");
/// ```
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: &str) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code: code.to_string(),
                message: message.to_string(),
                request_id: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::InvalidCredentials => {
                ApiError::new(StatusCode::UNAUTHORIZED, err.code(), "invalid username or password")
            }
            AuthError::TokenExpired => {
                ApiError::new(StatusCode::UNAUTHORIZED, err.code(), "session expired")
            }
            AuthError::TokenMalformed(reason) => {
                tracing::debug!(%reason, "rejected malformed token");
                ApiError::new(StatusCode::UNAUTHORIZED, err.code(), "invalid token")
            }
            AuthError::SigningError(reason) => {
                tracing::error!(%reason, "failed to sign session token");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    err.code(),
                    "unable to issue session token",
                )
            }
            AuthError::NotAuthorized => api_forbidden("not authorized"),
        }
    }
}

/// JSON body extractor whose rejections use the API error shape.
///
/// Unparseable bodies, unknown enum values and a missing content type all
/// become `validation_error` before the handler runs.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        api_validation_error(&rejection.body_text())
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        tracing::warn!(error = %err, "audit dispatch failed");
        ApiError::new(StatusCode::BAD_GATEWAY, err.code(), "worker node unavailable")
    }
}

pub fn api_not_found(message: &str) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", message)
}

pub fn api_conflict(message: &str) -> ApiError {
    ApiError::new(StatusCode::CONFLICT, "conflict", message)
}

/// Build a 500 from a store error, logging the cause.
pub fn api_internal(message: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, "admin storage error");
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Map a store error by category: missing rows are 404, duplicates 409,
/// anything else 500.
pub fn api_store(message: &str, err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(what) => api_not_found(&format!("{what} not found")),
        StoreError::Conflict(what) => api_conflict(&what),
        other => api_internal(message, &other),
    }
}

pub fn api_unauthorized(message: &str) -> ApiError {
    ApiError::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

pub fn api_forbidden(message: &str) -> ApiError {
    ApiError::new(StatusCode::FORBIDDEN, "forbidden", message)
}

pub fn api_validation_error(message: &str) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "validation_error", message)
}
