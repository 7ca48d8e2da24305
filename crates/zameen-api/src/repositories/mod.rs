//! Database access.
//!
//! Every query is parameterized and records `zameen_db_queries_total`
//! under a bounded operation name. Functions that take part in a
//! multi-statement write accept any `PgExecutor` so callers can pass a
//! transaction.

pub mod favorites;
pub mod inquiries;
pub mod properties;
pub mod property_images;
pub mod users;

use crate::errors::ApiError;
use crate::observability::metrics::record_db_query;
use std::time::Instant;

/// Record the query outcome and map driver errors to `ApiError::Database`.
pub(crate) fn observe<T>(
    operation: &'static str,
    start: Instant,
    result: Result<T, sqlx::Error>,
) -> Result<T, ApiError> {
    match result {
        Ok(value) => {
            record_db_query(operation, "success", start.elapsed());
            Ok(value)
        }
        Err(e) => {
            record_db_query(operation, "error", start.elapsed());
            Err(ApiError::Database(format!("{operation} failed: {e}")))
        }
    }
}

/// Whether `err` is a unique violation of the named constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation() && db.constraint() == Some(constraint))
        .unwrap_or(false)
}
