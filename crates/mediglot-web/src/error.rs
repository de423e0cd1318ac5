//! API error taxonomy and HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use mediglot_clients::ServiceError;
use mediglot_store::StoreError;

/// Errors surfaced to HTTP clients as `{"error": "..."}` bodies.
#[derive(Debug)]
pub enum ApiError {
    /// Missing/invalid request fields. 400.
    BadRequest(String),
    /// Missing or unknown bearer token, bad credentials. 401.
    Unauthorized(String),
    /// Record absent or not owned by the requesting user. 404.
    NotFound(String),
    /// External translation provider failure. 503.
    ServiceUnavailable(String),
    /// Anything unexpected. Logged in full, reported generically. 500.
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "internal error handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound("Translation not found".into()),
            StoreError::UsernameTaken => ApiError::BadRequest("Username already taken".into()),
            StoreError::InvalidCredentials => ApiError::Unauthorized("Invalid credentials".into()),
            other => ApiError::Internal(other.into()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        tracing::warn!(error = %e, "translation service failure");
        ApiError::ServiceUnavailable("Translation service error".into())
    }
}
