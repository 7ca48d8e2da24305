//! HTTP request handlers.
//!
//! Handlers translate between HTTP and the service layer: extract state,
//! claims, path and body, call one service function, and shape the
//! response. JSON bodies are parsed by hand and path rejections are
//! mapped, so malformed input is a 400 in the standard error shape rather
//! than axum's plain-text 400 or 422.

pub mod auth_handler;
pub mod favorites;
pub mod health;
pub mod inquiries;
pub mod metrics;
pub mod properties;
pub mod users;

pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;

use crate::errors::ApiError;
use axum::body::Bytes;
use axum::extract::{rejection::PathRejection, Path};
use serde::de::DeserializeOwned;

/// Deserialize a JSON request body, mapping failures to 400.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "zameen.handlers", error = %e, "Invalid request body");
        ApiError::BadRequest("Invalid request body".to_string())
    })
}

/// Unwrap path parameters, mapping a parse failure (e.g. `/properties/abc`) to 400.
pub(crate) fn parse_path<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    path.map(|Path(value)| value).map_err(|e| {
        tracing::debug!(target: "zameen.handlers", error = %e, "Invalid path parameter");
        ApiError::BadRequest("Invalid path parameter".to_string())
    })
}
