use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use concierge_core::IndexError;
use serde_json::json;

/// Handler error, rendered as `{"message": "..."}` with a matching status.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
            ApiError::Internal(m) => {
                tracing::error!(error = %m, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<IndexError> for ApiError {
    fn from(err: IndexError) -> Self { ApiError::Internal(format!("index rebuild failed: {err}")) }
}
