//! Admin user management.

use super::{parse_json, parse_path};
use crate::errors::ApiError;
use crate::models::{MessageResponse, UpdateRoleRequest, User};
use crate::routes::AppState;
use crate::services::user_service;
use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    Extension, Json,
};
use common::jwt::ClaimSet;
use std::sync::Arc;
use tracing::instrument;

#[instrument(skip_all, name = "zameen.users.list")]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(user_service::list_users(&state.pool, &claims).await?))
}

#[instrument(skip_all, name = "zameen.users.get")]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let user_id = parse_path(path)?;
    Ok(Json(
        user_service::get_user(&state.pool, &claims, user_id).await?,
    ))
}

/// `PUT /api/v1/users/:id` with `{role}`.
#[instrument(skip_all, name = "zameen.users.update_role")]
pub async fn update_user_role(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    path: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<Json<User>, ApiError> {
    let user_id = parse_path(path)?;
    let request: UpdateRoleRequest = parse_json(&body)?;
    Ok(Json(
        user_service::update_role(&state.pool, &claims, user_id, request).await?,
    ))
}

#[instrument(skip_all, name = "zameen.users.delete")]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = parse_path(path)?;
    user_service::delete_user(&state.pool, &claims, user_id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
