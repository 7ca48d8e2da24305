//! Request authentication and authorization.
//!
//! # Components
//!
//! - `authenticator` - Bearer token extraction from request headers
//! - `policy` - Role and ownership policies evaluated against verified claims

pub mod authenticator;
pub mod policy;

pub use authenticator::extract_bearer_token;
pub use policy::{authorize, Denial, Policy};
