//! Builder for hand-crafted test tokens.
//!
//! Unlike the service's own issuer, the builder lets a test choose every
//! claim and the signing algorithm, so rejection paths can be exercised
//! end to end.

use chrono::Utc;
use common::jwt::TOKEN_LIFETIME_SECONDS;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

/// Builder for signed test tokens.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new(42, "seller")
///     .issued_at(Utc::now().timestamp() - 90_000)
///     .sign(&test_jwt_secret(TEST_SECRET_SEED));
/// ```
pub struct TestTokenBuilder {
    user_id: i64,
    role: String,
    iat: i64,
    exp: i64,
    algorithm: Algorithm,
}

impl TestTokenBuilder {
    /// A token for `user_id` with `role`, issued now with the standard lifetime.
    ///
    /// `role` is free text so that unknown roles can be tested.
    pub fn new(user_id: i64, role: &str) -> Self {
        let now = Utc::now().timestamp();
        Self {
            user_id,
            role: role.to_string(),
            iat: now,
            exp: now + TOKEN_LIFETIME_SECONDS,
            algorithm: Algorithm::HS256,
        }
    }

    /// Set `iat` and move `exp` to keep the standard lifetime.
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self.exp = timestamp + TOKEN_LIFETIME_SECONDS;
        self
    }

    /// Issued two days ago, so expired for a day.
    pub fn expired(self) -> Self {
        self.issued_at(Utc::now().timestamp() - 2 * TOKEN_LIFETIME_SECONDS)
    }

    /// Sign with a different HMAC algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// The claims as JSON.
    pub fn claims(&self) -> serde_json::Value {
        json!({
            "iat": self.iat,
            "exp": self.exp,
            "user_id": self.user_id,
            "role": self.role,
        })
    }

    /// Sign the claims with `secret`.
    pub fn sign(self, secret: &[u8]) -> String {
        let header = Header::new(self.algorithm);
        encode(&header, &self.claims(), &EncodingKey::from_secret(secret))
            .expect("test token signing should succeed")
    }
}
