//! Authentication middleware for protected routes.
//!
//! `require_auth` locates the bearer token, verifies it, and stores the
//! verified [`ClaimSet`] in request extensions. Handlers read it with
//! `Extension<ClaimSet>` and apply their own [`Policy`](crate::auth::Policy).

use crate::auth::extract_bearer_token;
use crate::crypto::TokenCodec;
use crate::errors::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub codec: TokenCodec,
}

/// Reject the request unless it carries a valid bearer token.
///
/// # Response
///
/// - 401 `UNAUTHENTICATED` if no bearer token is present
/// - 401 `INVALID_TOKEN` if the token fails verification for any reason
/// - Otherwise continues with the `ClaimSet` in extensions
#[instrument(skip_all, name = "zameen.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(req.headers()).ok_or_else(|| {
        tracing::debug!(target: "zameen.middleware.auth", "No bearer token presented");
        ApiError::Unauthenticated
    })?;

    let claims = state.codec.verify(&token)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
