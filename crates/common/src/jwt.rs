//! JWT utilities shared across Apni Zameen crates.
//!
//! This module holds the pieces of the token format that both the API
//! service and its test harness must agree on:
//! - The claim set carried inside every access token
//! - The fixed token lifetime
//! - Size limits checked before any parsing
//! - The tagged rejection reasons produced by verification
//! - `iat` validation with clock skew tolerance
//!
//! Signing and verification live in the service's `crypto` module; this
//! module never touches key material.

use crate::types::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Lifetime of every issued access token (24 hours).
///
/// Not configurable per call: `exp` is always `iat + TOKEN_LIFETIME_SECONDS`.
pub const TOKEN_LIFETIME_SECONDS: i64 = 86_400;

/// Maximum allowed JWT size in bytes (8KB).
///
/// Tokens larger than this are rejected before base64 decoding or HMAC
/// computation. Our tokens are ~200 bytes.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

// =============================================================================
// Error Types
// =============================================================================

/// Why a token was rejected.
///
/// Every variant renders the same message so that callers which surface the
/// `Display` form cannot distinguish "expired" from "tampered". The variant
/// itself is available for logs and metrics.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// Not a JWT, oversized, undecodable claims, or unknown role.
    #[error("The access token is invalid or expired")]
    Malformed,

    /// Signed with a different secret.
    #[error("The access token is invalid or expired")]
    SignatureMismatch,

    /// Header names an algorithm other than the one we sign with.
    #[error("The access token is invalid or expired")]
    AlgorithmMismatch,

    /// `exp` is not after the current time.
    #[error("The access token is invalid or expired")]
    Expired,

    /// `iat` is further in the future than the clock skew allows.
    #[error("The access token is invalid or expired")]
    IssuedInFuture,
}

impl TokenRejection {
    /// Bounded label for metrics and structured logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRejection::Malformed => "malformed",
            TokenRejection::SignatureMismatch => "signature_mismatch",
            TokenRejection::AlgorithmMismatch => "algorithm_mismatch",
            TokenRejection::Expired => "expired",
            TokenRejection::IssuedInFuture => "issued_in_future",
        }
    }
}

// =============================================================================
// Claims Types
// =============================================================================

/// The signed payload of an access token.
///
/// Immutable once issued. A later role change on the user record does not
/// alter tokens already in circulation; they carry the role they were
/// issued with until `exp`.
///
/// `user_id` is redacted in Debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Subject user id.
    pub user_id: i64,

    /// Subject role at issue time.
    pub role: Role,
}

impl ClaimSet {
    /// Build the claim set for a token issued at `issued_at`.
    #[must_use]
    pub fn issued_at(user_id: i64, role: Role, issued_at: i64) -> Self {
        Self {
            iat: issued_at,
            exp: issued_at + TOKEN_LIFETIME_SECONDS,
            user_id,
            role,
        }
    }
}

impl fmt::Debug for ClaimSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimSet")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("user_id", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Reject tokens above [`MAX_JWT_SIZE_BYTES`] before any parsing.
///
/// # Errors
///
/// Returns `TokenRejection::Malformed` for oversized tokens.
pub fn check_token_size(token: &str) -> Result<(), TokenRejection> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(TokenRejection::Malformed);
    }
    Ok(())
}

/// Validate the `iat` claim against the current time.
///
/// # Errors
///
/// Returns `TokenRejection::IssuedInFuture` if `iat` is more than
/// `clock_skew` ahead of now.
pub fn validate_iat(iat: i64, clock_skew: Duration) -> Result<(), TokenRejection> {
    let now = chrono::Utc::now().timestamp();
    validate_iat_at(iat, clock_skew, now)
}

/// Deterministic variant of [`validate_iat`] against an explicit `now`.
///
/// # Errors
///
/// Returns `TokenRejection::IssuedInFuture` if `iat > now + clock_skew`.
pub fn validate_iat_at(iat: i64, clock_skew: Duration, now: i64) -> Result<(), TokenRejection> {
    // Configured skew is at most ten minutes
    #[allow(clippy::cast_possible_wrap)]
    let clock_skew_secs = clock_skew.as_secs() as i64;
    let max_iat = now + clock_skew_secs;

    if iat > max_iat {
        tracing::debug!(
            target: "common.jwt",
            iat = iat,
            now = now,
            max_allowed = max_iat,
            "Token rejected: iat too far in the future"
        );
        return Err(TokenRejection::IssuedInFuture);
    }

    Ok(())
}
