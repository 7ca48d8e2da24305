//! Observability for the Apni Zameen API.
//!
//! Metrics definitions plus the helpers used by handler and service
//! instrumentation.
//!
//! # Privacy by Default
//!
//! Instrumented functions use `#[instrument(skip_all)]` and list their
//! fields explicitly. Fields fall into three groups:
//! - **SAFE**: plain enums and labels (role, decision, rejection reason)
//! - **HASHED**: SHA-256 prefix for correlation (email addresses)
//! - **NEVER**: passwords, password hashes, bearer tokens, the signing secret

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// Used for values like email addresses that need to be correlated across
/// log lines without being stored in plaintext.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    hex::encode(result.get(..4).unwrap_or_default())
}
