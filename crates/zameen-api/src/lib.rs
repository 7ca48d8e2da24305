//! Apni Zameen API Library
//!
//! A property listing service: users register and log in for a 24-hour
//! bearer token, sellers publish listings with images, buyers send
//! inquiries and keep favorites, admins manage accounts.
//!
//! # Architecture
//!
//! Handler -> Service -> Repository:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! Every protected request passes through the same chain: the bearer
//! token is located (`auth::authenticator`), verified (`crypto`), and the
//! resulting claims are checked against a declarative policy
//! (`auth::policy`) inside the service.
//!
//! # Modules
//!
//! - `auth` - Bearer token extraction and authorization policies
//! - `config` - Service configuration from environment
//! - `crypto` - Token signing/verification and password hashing
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Authentication and HTTP metrics middleware
//! - `models` - Data models
//! - `observability` - Metrics and log-field helpers
//! - `repositories` - Database access layer
//! - `routes` - Axum router setup
//! - `services` - Business logic layer

pub mod auth;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
