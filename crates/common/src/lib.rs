//! Primitives shared by the Apni Zameen API and its test utilities.

#![warn(clippy::pedantic)]

/// User roles.
pub mod types;

/// Redacting wrappers for keys and passwords.
pub mod secret;

/// Token claim set, rejection reasons and pre-parse checks.
pub mod jwt;
