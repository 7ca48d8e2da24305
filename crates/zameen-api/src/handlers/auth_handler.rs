//! Registration, login and the current user.

use super::parse_json;
use crate::errors::ApiError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::routes::AppState;
use crate::services::user_service;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use common::jwt::ClaimSet;
use std::sync::Arc;
use tracing::instrument;

/// `POST /api/v1/auth/register`
///
/// # Response
///
/// - 201 Created with `{message, token, user}`
/// - 400 on validation failure or an attempt to register as admin
/// - 409 if the email is already registered
#[instrument(skip_all, name = "zameen.auth.register")]
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let request: RegisterRequest = parse_json(&body)?;
    let response = user_service::register(
        &state.pool,
        &state.codec,
        state.config.bcrypt_cost,
        request,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /api/v1/auth/login`
#[instrument(skip_all, name = "zameen.auth.login")]
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AuthResponse>, ApiError> {
    let request: LoginRequest = parse_json(&body)?;
    let response = user_service::login(&state.pool, &state.codec, request).await?;
    Ok(Json(response))
}

/// `GET /api/v1/me`
#[instrument(skip_all, name = "zameen.auth.me")]
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
) -> Result<Json<User>, ApiError> {
    let user = user_service::current_user(&state.pool, &claims).await?;
    Ok(Json(user))
}
