//! Favorites repository.

use super::{is_unique_violation, observe};
use crate::errors::ApiError;
use crate::models::FavoriteProperty;
use crate::observability::metrics::record_db_query;
use sqlx::PgPool;
use std::time::Instant;
use tracing::instrument;

/// A user's favorited listings, most recently favorited first.
#[instrument(skip_all, name = "zameen.repo.list_favorites")]
pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<FavoriteProperty>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, FavoriteProperty>(
        r#"
        SELECT f.id AS favorite_id, f.created_at AS favorited_at,
               p.id, p.user_id, p.title, p.description, p.price, p.property_type, p.status,
               p.bedrooms, p.bathrooms, p.area, p.address, p.city, p.state, p.zip_code,
               p.created_at, p.updated_at,
               COALESCE(
                   ARRAY_AGG(pi.image_url ORDER BY pi.is_primary DESC, pi.id ASC)
                       FILTER (WHERE pi.id IS NOT NULL),
                   ARRAY[]::text[]
               ) AS images
        FROM favorites f
        JOIN properties p ON f.property_id = p.id
        LEFT JOIN property_images pi ON pi.property_id = p.id
        WHERE f.user_id = $1
        GROUP BY f.id, p.id
        ORDER BY f.created_at DESC, f.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await;

    observe("list_favorites", start, result)
}

/// Favorite a listing.
///
/// # Errors
///
/// Returns `ApiError::Conflict` if the listing is already a favorite.
#[instrument(skip_all, name = "zameen.repo.add_favorite")]
pub async fn add(pool: &PgPool, user_id: i64, property_id: i64) -> Result<i64, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO favorites (user_id, property_id)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(property_id)
    .fetch_one(pool)
    .await;

    if let Err(e) = &result {
        if is_unique_violation(e, "favorites_user_property_unique") {
            record_db_query("add_favorite", "conflict", start.elapsed());
            return Err(ApiError::Conflict(
                "Property already in favorites".to_string(),
            ));
        }
    }

    observe("add_favorite", start, result)
}

#[instrument(skip_all, name = "zameen.repo.favorite_exists")]
pub async fn exists(pool: &PgPool, user_id: i64, property_id: i64) -> Result<bool, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = $1 AND property_id = $2)",
    )
    .bind(user_id)
    .bind(property_id)
    .fetch_one(pool)
    .await;

    observe("favorite_exists", start, result)
}

/// Remove a favorite. Returns `false` if it was not a favorite.
#[instrument(skip_all, name = "zameen.repo.remove_favorite")]
pub async fn remove(pool: &PgPool, user_id: i64, property_id: i64) -> Result<bool, ApiError> {
    let start = Instant::now();
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND property_id = $2")
        .bind(user_id)
        .bind(property_id)
        .execute(pool)
        .await;

    observe("remove_favorite", start, result).map(|r| r.rows_affected() > 0)
}
