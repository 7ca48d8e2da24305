//! Redacting wrappers for sensitive values.
//!
//! Anything that must never reach a log line (the token signing key,
//! passwords in flight) is held in a [`secrecy`] wrapper, whose `Debug`
//! prints `[REDACTED]` and whose memory is zeroized on drop. Reading the
//! value requires an explicit `expose_secret()` call, which keeps every
//! access greppable.
//!
//! ```rust
//! use common::secret::{signing_key, ExposeSecret};
//!
//! let key = signing_key(vec![0x42; 32]);
//! assert!(format!("{key:?}").contains("REDACTED"));
//! assert_eq!(key.expose_secret().len(), 32);
//! ```

pub use secrecy::{ExposeSecret, SecretBox, SecretString};

/// The HS256 signing key, loaded once at startup and never mutated.
pub type SigningKey = SecretBox<Vec<u8>>;

/// Wrap raw key bytes.
#[must_use]
pub fn signing_key(bytes: Vec<u8>) -> SigningKey {
    SecretBox::new(Box::new(bytes))
}

/// Copy a key into a fresh wrapper (`SecretBox` is deliberately not `Clone`).
#[must_use]
pub fn duplicate_key(key: &SigningKey) -> SigningKey {
    signing_key(key.expose_secret().clone())
}
