//! Listing image repository.
//!
//! Images are stored as URLs. The first image of a listing is its primary
//! image; at most one image per listing is primary.

use super::observe;
use crate::errors::ApiError;
use crate::models::PropertyImage;
use sqlx::{PgExecutor, PgPool};
use std::time::Instant;
use tracing::instrument;

/// Images of a listing, primary first.
#[instrument(skip_all, name = "zameen.repo.list_property_images")]
pub async fn list_for_property(
    pool: &PgPool,
    property_id: i64,
) -> Result<Vec<PropertyImage>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, PropertyImage>(
        r#"
        SELECT id, property_id, image_url, is_primary, created_at
        FROM property_images
        WHERE property_id = $1
        ORDER BY is_primary DESC, id ASC
        "#,
    )
    .bind(property_id)
    .fetch_all(pool)
    .await;

    observe("list_property_images", start, result)
}

/// Attach images in order. The first URL becomes primary.
///
/// Callers replacing a listing's images must delete the old set first in
/// the same transaction.
#[instrument(skip_all, name = "zameen.repo.insert_property_images", fields(count = urls.len()))]
pub async fn insert_images<'e, E>(
    executor: E,
    property_id: i64,
    urls: &[String],
) -> Result<u64, ApiError>
where
    E: PgExecutor<'e>,
{
    if urls.is_empty() {
        return Ok(0);
    }

    let start = Instant::now();
    let result = sqlx::query(
        r#"
        INSERT INTO property_images (property_id, image_url, is_primary)
        SELECT $1, url, ord = 1
        FROM UNNEST($2::text[]) WITH ORDINALITY AS t(url, ord)
        ORDER BY ord
        "#,
    )
    .bind(property_id)
    .bind(urls)
    .execute(executor)
    .await;

    observe("insert_property_images", start, result).map(|r| r.rows_affected())
}

/// Remove every image of a listing.
#[instrument(skip_all, name = "zameen.repo.delete_property_images")]
pub async fn delete_for_property<'e, E>(executor: E, property_id: i64) -> Result<u64, ApiError>
where
    E: PgExecutor<'e>,
{
    let start = Instant::now();
    let result = sqlx::query("DELETE FROM property_images WHERE property_id = $1")
        .bind(property_id)
        .execute(executor)
        .await;

    observe("delete_property_images", start, result).map(|r| r.rows_affected())
}

/// Delete one image of a listing.
///
/// Returns `None` if no such image belongs to the listing, otherwise whether
/// the deleted image was primary.
#[instrument(skip_all, name = "zameen.repo.delete_property_image")]
pub async fn delete_image<'e, E>(
    executor: E,
    property_id: i64,
    image_id: i64,
) -> Result<Option<bool>, ApiError>
where
    E: PgExecutor<'e>,
{
    let start = Instant::now();
    let result = sqlx::query_scalar::<_, bool>(
        r#"
        DELETE FROM property_images
        WHERE id = $1 AND property_id = $2
        RETURNING is_primary
        "#,
    )
    .bind(image_id)
    .bind(property_id)
    .fetch_optional(executor)
    .await;

    observe("delete_property_image", start, result)
}

/// Make the oldest remaining image primary, if the listing has one.
#[instrument(skip_all, name = "zameen.repo.promote_property_image")]
pub async fn promote_first<'e, E>(executor: E, property_id: i64) -> Result<bool, ApiError>
where
    E: PgExecutor<'e>,
{
    let start = Instant::now();
    let result = sqlx::query(
        r#"
        UPDATE property_images
        SET is_primary = TRUE
        WHERE id = (
            SELECT id FROM property_images
            WHERE property_id = $1
            ORDER BY id ASC
            LIMIT 1
        )
        "#,
    )
    .bind(property_id)
    .execute(executor)
    .await;

    observe("promote_property_image", start, result).map(|r| r.rows_affected() > 0)
}
