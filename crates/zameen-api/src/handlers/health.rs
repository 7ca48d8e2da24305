//! Liveness and readiness probes.

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

/// Liveness: the process is up and serving HTTP.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness: one round trip to Postgres.
#[tracing::instrument(skip_all, name = "zameen.health.readiness")]
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
    {
        Ok(_) => (StatusCode::OK, Json(ReadinessResponse::ready())),
        Err(e) => {
            tracing::warn!(target: "zameen.health", error = %e, "Database unreachable, reporting not ready");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse::database_down()),
            )
        }
    }
}
