//! Metrics definitions for the Apni Zameen API.
//!
//! All metrics follow Prometheus naming conventions:
//! - `zameen_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: parameterized route templates plus `/other`
//! - `status`: success, error, timeout
//! - `reason`: bounded by `TokenRejection` and `Denial` variants
//! - `operation`: bounded by repository functions

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("zameen_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("zameen_db_query".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.020, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set DB query buckets: {e}"))?
        // Coarse buckets so password timing is not observable through metrics
        .set_buckets_for_metric(
            Matcher::Prefix("zameen_bcrypt".to_string()),
            &[0.050, 0.100, 0.250, 0.500, 1.000, 2.000],
        )
        .map_err(|e| format!("Failed to set bcrypt buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `zameen_http_requests_total`, `zameen_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
///
/// Captures framework-level rejections (415, 400, 404, 405) as well as
/// handler responses.
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("zameen_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("zameen_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/" | "/health" | "/ready" | "/metrics" | "/api/v1/auth/register"
        | "/api/v1/auth/login" | "/api/v1/me" | "/api/v1/me/properties"
        | "/api/v1/me/inquiries" | "/api/v1/users" | "/api/v1/properties"
        | "/api/v1/inquiries" | "/api/v1/favorites" => path.to_string(),
        _ => normalize_dynamic_endpoint(path),
    }
}

/// Replace id segments with their route placeholder.
fn normalize_dynamic_endpoint(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();

    let template = match parts.as_slice() {
        ["", "api", "v1", "users", _] => "/api/v1/users/{id}",
        ["", "api", "v1", "properties", _] => "/api/v1/properties/{id}",
        ["", "api", "v1", "properties", _, "images", _] => {
            "/api/v1/properties/{id}/images/{image_id}"
        }
        ["", "api", "v1", "inquiries", _] => "/api/v1/inquiries/{id}",
        ["", "api", "v1", "favorites", _] => "/api/v1/favorites/{property_id}",
        _ => "/other",
    };

    template.to_string()
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record a token being issued.
///
/// Metric: `zameen_token_issued_total`
/// Labels: `grant` (register, login)
pub fn record_token_issued(grant: &str) {
    counter!("zameen_token_issued_total", "grant" => grant.to_string()).increment(1);
}

/// Record a token verification outcome.
///
/// Metric: `zameen_token_validations_total`
/// Labels: `status` (success, error), `reason` (`TokenRejection::as_str` or "none")
pub fn record_token_validation(status: &str, reason: Option<&str>) {
    let reason = reason.unwrap_or("none");
    counter!("zameen_token_validations_total",
        "status" => status.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

// ============================================================================
// Authorization Metrics
// ============================================================================

/// Record a policy decision.
///
/// Metric: `zameen_authorization_decisions_total`
/// Labels: `decision` (allow, deny), `reason` (none, role_not_permitted, not_owner)
pub fn record_authorization_decision(decision: &str, reason: &str) {
    counter!("zameen_authorization_decisions_total",
        "decision" => decision.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

// ============================================================================
// Database Metrics
// ============================================================================

/// Record database query execution
///
/// Metric: `zameen_db_query_duration_seconds`, `zameen_db_queries_total`
/// Labels: `operation`, `status`
pub fn record_db_query(operation: &str, status: &str, duration: Duration) {
    histogram!("zameen_db_query_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("zameen_db_queries_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Crypto Metrics
// ============================================================================

/// Record bcrypt operation duration
///
/// Metric: `zameen_bcrypt_duration_seconds`
/// Labels: `operation` (hash, verify)
pub fn record_bcrypt_duration(operation: &str, duration: Duration) {
    histogram!("zameen_bcrypt_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());
}
