//! # Apni Zameen Test Utilities
//!
//! Shared test utilities for the Apni Zameen API.
//!
//! This crate provides:
//! - Deterministic signing secrets (fixed bytes for reproducible tests)
//! - A claim builder that signs arbitrary tokens, including expired,
//!   foreign-key and wrong-algorithm ones (`TestTokenBuilder`)
//! - A server harness that runs the real router on an ephemeral port
//!   (`TestApiServer`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zameen_test_utils::*;
//!
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_example(pool: PgPool) -> Result<(), anyhow::Error> {
//!     let server = TestApiServer::spawn(pool).await?;
//!     let seller = server.register("seller@example.com", Role::Seller).await?;
//!
//!     let expired = TestTokenBuilder::new(seller.id, "seller")
//!         .expired()
//!         .sign(&test_jwt_secret(TEST_SECRET_SEED));
//!     Ok(())
//! }
//! ```

pub mod crypto_fixtures;
pub mod server_harness;
pub mod token_builders;

pub use crypto_fixtures::*;
pub use server_harness::*;
pub use token_builders::*;
