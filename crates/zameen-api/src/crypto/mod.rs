//! Token signing and password hashing.
//!
//! Access tokens are HS256 JWTs signed with the process-wide secret from
//! `JWT_SECRET`. Passwords are hashed with bcrypt at the configured cost.

use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::ApiError;
use crate::observability::metrics::{record_bcrypt_duration, record_token_validation};
use common::jwt::{check_token_size, validate_iat, ClaimSet, TokenRejection};
use common::secret::{ExposeSecret, SigningKey};
use common::types::Role;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::instrument;

/// The only algorithm tokens are signed and accepted with.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Bcrypt hash verified when a login names an unknown email, so the
/// response time does not reveal whether the account exists.
const DUMMY_PASSWORD_HASH: &str = "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

/// Issues and verifies access tokens.
///
/// Holds the signing secret as derived `jsonwebtoken` keys. Cheap to clone;
/// the secret is read-only for the life of the process.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock_skew: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &TOKEN_ALGORITHM)
            .field("secret", &"[REDACTED]")
            .field("clock_skew", &self.clock_skew)
            .finish()
    }
}

impl TokenCodec {
    /// Build a codec from the configured secret and `iat` clock skew.
    pub fn new(secret: &SigningKey, clock_skew_seconds: i64) -> Self {
        let secret = secret.expose_secret();

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            clock_skew: Duration::from_secs(clock_skew_seconds.unsigned_abs()),
        }
    }

    /// Issue a 24-hour token for `user_id` with `role`, starting now.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Crypto` if signing fails.
    #[instrument(skip_all)]
    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, ApiError> {
        self.issue_at(user_id, role, chrono::Utc::now().timestamp())
    }

    /// Issue a token as if it were issued at `issued_at` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Crypto` if signing fails.
    #[instrument(skip_all)]
    pub fn issue_at(&self, user_id: i64, role: Role, issued_at: i64) -> Result<String, ApiError> {
        let claims = ClaimSet::issued_at(user_id, role, issued_at);

        let mut header = Header::new(TOKEN_ALGORITHM);
        header.typ = Some("JWT".to_string());

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| ApiError::Crypto(format!("JWT signing operation failed: {}", e)))
    }

    /// Verify `token` and report the precise rejection reason.
    ///
    /// Checks, in order: size, algorithm, signature, claim shape, `exp`
    /// (strictly after now, no leeway) and `iat` (not beyond the clock skew).
    ///
    /// # Errors
    ///
    /// Returns the [`TokenRejection`] describing the first failed check.
    #[instrument(skip_all)]
    pub fn inspect(&self, token: &str) -> Result<ClaimSet, TokenRejection> {
        let result = self.inspect_unrecorded(token);

        match &result {
            Ok(_) => record_token_validation("success", None),
            Err(rejection) => {
                tracing::debug!(
                    target: "zameen.crypto",
                    reason = rejection.as_str(),
                    "Token rejected"
                );
                record_token_validation("error", Some(rejection.as_str()));
            }
        }

        result
    }

    fn inspect_unrecorded(&self, token: &str) -> Result<ClaimSet, TokenRejection> {
        check_token_size(token)?;

        let token_data = decode::<ClaimSet>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenRejection::SignatureMismatch,
                ErrorKind::InvalidAlgorithm => TokenRejection::AlgorithmMismatch,
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                _ => TokenRejection::Malformed,
            })?;

        let claims = token_data.claims;

        // jsonwebtoken accepts exp == now; a token is only valid strictly before exp
        if claims.exp <= chrono::Utc::now().timestamp() {
            return Err(TokenRejection::Expired);
        }

        validate_iat(claims.iat, self.clock_skew)?;

        Ok(claims)
    }

    /// Verify `token`, collapsing every rejection into one caller-facing error.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidToken` with a generic message for any
    /// rejection reason.
    pub fn verify(&self, token: &str) -> Result<ClaimSet, ApiError> {
        self.inspect(token)
            .map_err(|rejection| ApiError::InvalidToken(rejection.to_string()))
    }
}

/// Hash a password with bcrypt using the configured cost factor.
///
/// # Errors
///
/// Returns `ApiError::Crypto` if the cost is outside 10-14 or hashing fails.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(ApiError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    let start = Instant::now();
    let hash = bcrypt::hash(password, cost)
        .map_err(|e| ApiError::Crypto(format!("Password hashing failed: {}", e)));
    record_bcrypt_duration("hash", start.elapsed());
    hash
}

/// Verify a password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns `ApiError::Crypto` if the stored hash is not a valid bcrypt hash.
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let start = Instant::now();
    let result = bcrypt::verify(password, hash)
        .map_err(|e| ApiError::Crypto(format!("Password verification failed: {}", e)));
    record_bcrypt_duration("verify", start.elapsed());
    result
}

/// Spend the same bcrypt work as a real verification, then report failure.
#[instrument(skip_all)]
pub fn verify_against_dummy(password: &str) -> bool {
    let _ = verify_password(password, DUMMY_PASSWORD_HASH);
    false
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use common::jwt::TOKEN_LIFETIME_SECONDS;
    use crate::config::{DEFAULT_JWT_CLOCK_SKEW_SECONDS, MAX_JWT_CLOCK_SKEW_SECONDS};
    use common::secret::signing_key;

    const TEST_SECRET: [u8; 32] = [0x42; 32];

    fn codec() -> TokenCodec {
        TokenCodec::new(&signing_key(TEST_SECRET.to_vec()), DEFAULT_JWT_CLOCK_SKEW_SECONDS)
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    #[test]
    fn test_issue_then_verify_round_trip() {
        let codec = codec();

        for role in Role::ALL {
            for user_id in [1_i64, 42, 9_000_000_000] {
                let token = codec.issue(user_id, role).unwrap();
                let claims = codec.verify(&token).unwrap();

                assert_eq!(claims.user_id, user_id);
                assert_eq!(claims.role, role);
                assert_eq!(claims.exp, claims.iat + TOKEN_LIFETIME_SECONDS);
            }
        }
    }

    #[test]
    fn test_token_header_names_hs256() {
        let token = codec().issue(7, Role::Buyer).unwrap();
        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        let issued = now() - TOKEN_LIFETIME_SECONDS - 10;
        let token = codec.issue_at(42, Role::Seller, issued).unwrap();

        assert_eq!(codec.inspect(&token), Err(TokenRejection::Expired));
        assert!(matches!(codec.verify(&token), Err(ApiError::InvalidToken(_))));
    }

    #[test]
    fn test_token_expiring_this_second_rejected() {
        let codec = codec();
        let token = codec
            .issue_at(42, Role::Seller, now() - TOKEN_LIFETIME_SECONDS)
            .unwrap();

        assert_eq!(codec.inspect(&token), Err(TokenRejection::Expired));
    }

    #[test]
    fn test_old_but_unexpired_token_accepted() {
        let codec = codec();
        let token = codec
            .issue_at(42, Role::Seller, now() - TOKEN_LIFETIME_SECONDS + 60)
            .unwrap();

        assert!(codec.inspect(&token).is_ok());
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let other = TokenCodec::new(&signing_key(vec![0x17; 32]), 300);
        let token = other.issue(42, Role::Admin).unwrap();

        assert_eq!(codec().inspect(&token), Err(TokenRejection::SignatureMismatch));
    }

    #[test]
    fn test_foreign_algorithm_rejected() {
        let claims = ClaimSet::issued_at(42, Role::Admin, now());
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(&TEST_SECRET),
        )
        .unwrap();

        assert_eq!(codec().inspect(&token), Err(TokenRejection::AlgorithmMismatch));
    }

    #[test]
    fn test_unsigned_none_algorithm_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&ClaimSet::issued_at(1, Role::Admin, now())).unwrap(),
        );
        let token = format!("{header}.{payload}.");

        assert_eq!(codec().inspect(&token), Err(TokenRejection::Malformed));
    }

    #[test]
    fn test_malformed_strings_rejected() {
        let codec = codec();
        let inputs = [
            "",
            "not-a-jwt",
            "a.b",
            "a.b.c",
            "a.b.c.d",
            "....",
            "Bearer abc",
            "\u{0}\u{1}",
        ];

        for input in inputs {
            assert_eq!(
                codec.inspect(input),
                Err(TokenRejection::Malformed),
                "input {input:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec();
        let token = codec.issue(42, Role::Buyer).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&ClaimSet::issued_at(42, Role::Admin, now())).unwrap(),
        );
        let tampered = format!("{}.{}.{}", parts[0], forged, parts[2]);

        assert_eq!(codec.inspect(&tampered), Err(TokenRejection::SignatureMismatch));
    }

    #[test]
    fn test_unknown_role_rejected_as_malformed() {
        let payload = serde_json::json!({
            "iat": now(),
            "exp": now() + 3600,
            "user_id": 5,
            "role": "superuser",
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(&TEST_SECRET),
        )
        .unwrap();

        assert_eq!(codec().inspect(&token), Err(TokenRejection::Malformed));
    }

    #[test]
    fn test_oversized_token_rejected() {
        let huge = "a".repeat(common::jwt::MAX_JWT_SIZE_BYTES + 1);
        assert_eq!(codec().inspect(&huge), Err(TokenRejection::Malformed));
    }

    #[test]
    fn test_future_iat_beyond_skew_rejected() {
        let codec = codec();
        let token = codec.issue_at(42, Role::Buyer, now() + 3600).unwrap();

        assert_eq!(codec.inspect(&token), Err(TokenRejection::IssuedInFuture));
    }

    #[test]
    fn test_future_iat_within_skew_accepted() {
        let codec = codec();
        let token = codec.issue_at(42, Role::Buyer, now() + 60).unwrap();

        assert!(codec.inspect(&token).is_ok());
    }

    #[test]
    fn test_configured_skew_bounds_future_iat() {
        let codec = TokenCodec::new(&signing_key(TEST_SECRET.to_vec()), MAX_JWT_CLOCK_SKEW_SECONDS);

        let inside = codec
            .issue_at(7, Role::Seller, now() + MAX_JWT_CLOCK_SKEW_SECONDS - 30)
            .unwrap();
        assert!(codec.inspect(&inside).is_ok());

        let outside = codec
            .issue_at(7, Role::Seller, now() + MAX_JWT_CLOCK_SKEW_SECONDS + 30)
            .unwrap();
        assert_eq!(codec.inspect(&outside), Err(TokenRejection::IssuedInFuture));
    }

    #[test]
    fn test_verify_collapses_reasons_into_one_message() {
        let codec = codec();
        let expired = codec
            .issue_at(1, Role::Buyer, now() - 2 * TOKEN_LIFETIME_SECONDS)
            .unwrap();

        let messages: Vec<String> = ["garbage", expired.as_str()]
            .iter()
            .map(|t| match codec.verify(t) {
                Err(ApiError::InvalidToken(msg)) => msg,
                other => panic!("expected InvalidToken, got {other:?}"),
            })
            .collect();

        assert_eq!(messages[0], messages[1]);
        assert_eq!(messages[0], "The access token is invalid or expired");
    }

    #[test]
    fn test_codec_debug_redacts_secret() {
        let debug = format!("{:?}", codec());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("66, 66"));
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("correct horse", MIN_BCRYPT_COST).unwrap();

        assert!(hash.starts_with("$2b$10$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_password_hash_rejects_cost_out_of_range() {
        assert!(matches!(
            hash_password("pw", MIN_BCRYPT_COST - 1),
            Err(ApiError::Crypto(_))
        ));
        assert!(matches!(
            hash_password("pw", MAX_BCRYPT_COST + 1),
            Err(ApiError::Crypto(_))
        ));
    }

    #[test]
    fn test_verify_password_with_invalid_hash() {
        assert!(matches!(
            verify_password("pw", "not-a-bcrypt-hash"),
            Err(ApiError::Crypto(_))
        ));
    }

    #[test]
    fn test_verify_against_dummy_always_fails() {
        assert!(!verify_against_dummy("anything"));
        assert!(!verify_against_dummy(""));
    }
}
