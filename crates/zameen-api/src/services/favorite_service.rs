//! Per-user favorite listings.

use crate::errors::ApiError;
use crate::models::{AddFavoriteRequest, FavoriteCheckResponse, FavoriteProperty};
use crate::repositories::{favorites, properties};
use common::jwt::ClaimSet;
use sqlx::PgPool;
use tracing::instrument;

#[instrument(skip_all, name = "zameen.service.list_favorites")]
pub async fn list(pool: &PgPool, claims: &ClaimSet) -> Result<Vec<FavoriteProperty>, ApiError> {
    favorites::list_for_user(pool, claims.user_id).await
}

/// Favorite a listing. Unknown listing is 404, a repeat is 409.
#[instrument(skip_all, name = "zameen.service.add_favorite")]
pub async fn add(
    pool: &PgPool,
    claims: &ClaimSet,
    request: AddFavoriteRequest,
) -> Result<(), ApiError> {
    let property_id = request
        .property_id
        .ok_or_else(|| ApiError::BadRequest("property_id is required".to_string()))?;

    if properties::get_owner_id(pool, property_id).await?.is_none() {
        return Err(ApiError::NotFound("Property not found".to_string()));
    }

    favorites::add(pool, claims.user_id, property_id).await?;
    Ok(())
}

#[instrument(skip_all, name = "zameen.service.check_favorite")]
pub async fn check(
    pool: &PgPool,
    claims: &ClaimSet,
    property_id: i64,
) -> Result<FavoriteCheckResponse, ApiError> {
    let is_favorite = favorites::exists(pool, claims.user_id, property_id).await?;
    Ok(FavoriteCheckResponse { is_favorite })
}

#[instrument(skip_all, name = "zameen.service.remove_favorite")]
pub async fn remove(pool: &PgPool, claims: &ClaimSet, property_id: i64) -> Result<(), ApiError> {
    if !favorites::remove(pool, claims.user_id, property_id).await? {
        return Err(ApiError::NotFound("Favorite not found".to_string()));
    }
    Ok(())
}
