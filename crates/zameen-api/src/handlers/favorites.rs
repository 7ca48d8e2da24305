//! Favorites endpoints. All require authentication.

use super::{parse_json, parse_path};
use crate::errors::ApiError;
use crate::models::{AddFavoriteRequest, FavoriteCheckResponse, FavoriteProperty, MessageResponse};
use crate::routes::AppState;
use crate::services::favorite_service;
use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use common::jwt::ClaimSet;
use std::sync::Arc;
use tracing::instrument;

#[instrument(skip_all, name = "zameen.favorites.list")]
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
) -> Result<Json<Vec<FavoriteProperty>>, ApiError> {
    Ok(Json(favorite_service::list(&state.pool, &claims).await?))
}

#[instrument(skip_all, name = "zameen.favorites.add")]
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let request: AddFavoriteRequest = parse_json(&body)?;
    favorite_service::add(&state.pool, &claims, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Property added to favorites")),
    ))
}

#[instrument(skip_all, name = "zameen.favorites.check")]
pub async fn check_favorite(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<FavoriteCheckResponse>, ApiError> {
    let property_id = parse_path(path)?;
    Ok(Json(
        favorite_service::check(&state.pool, &claims, property_id).await?,
    ))
}

#[instrument(skip_all, name = "zameen.favorites.remove")]
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let property_id = parse_path(path)?;
    favorite_service::remove(&state.pool, &claims, property_id).await?;
    Ok(Json(MessageResponse::new("Property removed from favorites")))
}
