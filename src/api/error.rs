//! Route-boundary error translation
//!
//! Every service error surfaces as HTTP 500 with the error text in a
//! `detail` field, mirroring the uniform handling clients already expect.
//! The distinguishing information (missing model path, missing adapter
//! files, uninitialized store) lives in the error messages themselves.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::RagServeError;

/// Wrapper turning crate errors into HTTP responses
pub struct ApiError(pub RagServeError);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<RagServeError> for ApiError {
    fn from(err: RagServeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.0.to_string();
        error!("Request failed: {}", detail);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": detail })),
        )
            .into_response()
    }
}
