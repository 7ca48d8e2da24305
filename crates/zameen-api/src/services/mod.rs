//! Business logic.
//!
//! Services validate input, evaluate authorization policies against the
//! verified claims, and call into the repositories. Ownership is always
//! read from the database at the time of the request.

pub mod favorite_service;
pub mod inquiry_service;
pub mod property_service;
pub mod user_service;

use crate::errors::ApiError;

/// Trimmed value of a required text field, or 400 naming the field.
pub(crate) fn require_text(field: &str, value: Option<&str>) -> Result<String, ApiError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ApiError::BadRequest(format!("{field} is required"))),
    }
}

/// Trimmed value of an optional text field; blank counts as absent.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
