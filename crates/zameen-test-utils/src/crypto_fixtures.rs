//! Deterministic signing secrets for testing.
//!
//! The same seed always produces the same secret, so tokens signed in a
//! test can be verified by a server built from the same seed.

/// Seed of the secret `TestApiServer` signs with.
pub const TEST_SECRET_SEED: u8 = 1;

/// Length of generated secrets (the minimum the service accepts).
pub const TEST_SECRET_LEN: usize = 32;

/// A 32-byte HS256 secret derived from `seed`.
///
/// # Example
/// ```rust,ignore
/// assert_eq!(test_jwt_secret(1), test_jwt_secret(1));
/// assert_ne!(test_jwt_secret(1), test_jwt_secret(2));
/// ```
pub fn test_jwt_secret(seed: u8) -> Vec<u8> {
    (0..TEST_SECRET_LEN)
        .map(|i| seed.wrapping_mul(31).wrapping_add(i as u8).wrapping_mul(7))
        .collect()
}
