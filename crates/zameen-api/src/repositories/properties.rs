//! Property listing repository.

use super::observe;
use crate::errors::ApiError;
use crate::models::{
    NewProperty, PropertyChanges, PropertyRow, PropertySearch, PropertySummary, PropertyWithOwner,
};
use sqlx::{PgExecutor, PgPool};
use std::time::Instant;
use tracing::instrument;

/// Columns of `properties` aliased as `p`, in `PropertyRow` order.
macro_rules! property_columns {
    () => {
        "p.id, p.user_id, p.title, p.description, p.price, p.property_type, p.status, \
         p.bedrooms, p.bathrooms, p.area, p.address, p.city, p.state, p.zip_code, \
         p.created_at, p.updated_at"
    };
}

/// Summary select shared by search and owner listings.
macro_rules! summary_select {
    () => {
        concat!(
            "SELECT ",
            property_columns!(),
            ", u.name AS owner_name, \
             (SELECT pi.image_url FROM property_images pi \
              WHERE pi.property_id = p.id AND pi.is_primary \
              ORDER BY pi.id LIMIT 1) AS primary_image \
             FROM properties p JOIN users u ON p.user_id = u.id"
        )
    };
}

/// Search listings, newest first.
///
/// `city` matches case-insensitively anywhere in the column; `bedrooms`
/// is a minimum.
#[instrument(skip_all, name = "zameen.repo.search_properties")]
pub async fn search(
    pool: &PgPool,
    filters: &PropertySearch,
) -> Result<Vec<PropertySummary>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, PropertySummary>(concat!(
        summary_select!(),
        " WHERE ($1::text IS NULL OR p.city ILIKE '%' || $1 || '%')",
        " AND ($2::text IS NULL OR p.property_type = $2)",
        " AND ($3::float8 IS NULL OR p.price >= $3)",
        " AND ($4::float8 IS NULL OR p.price <= $4)",
        " AND ($5::int4 IS NULL OR p.bedrooms >= $5)",
        " AND ($6::text IS NULL OR p.status = $6)",
        " ORDER BY p.created_at DESC, p.id DESC"
    ))
    .bind(filters.city.as_deref())
    .bind(filters.property_type.map(|t| t.as_str()))
    .bind(filters.min_price)
    .bind(filters.max_price)
    .bind(filters.bedrooms)
    .bind(filters.status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await;

    observe("search_properties", start, result)
}

/// Listings owned by `user_id`, newest first.
#[instrument(skip_all, name = "zameen.repo.list_properties_by_owner")]
pub async fn list_by_owner(pool: &PgPool, user_id: i64) -> Result<Vec<PropertySummary>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, PropertySummary>(concat!(
        summary_select!(),
        " WHERE p.user_id = $1 ORDER BY p.created_at DESC, p.id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await;

    observe("list_properties_by_owner", start, result)
}

/// Listing with owner contact details.
#[instrument(skip_all, name = "zameen.repo.get_property")]
pub async fn get_with_owner(
    pool: &PgPool,
    property_id: i64,
) -> Result<Option<PropertyWithOwner>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, PropertyWithOwner>(concat!(
        "SELECT ",
        property_columns!(),
        ", u.name AS owner_name, u.email AS owner_email, u.phone AS owner_phone \
         FROM properties p JOIN users u ON p.user_id = u.id \
         WHERE p.id = $1"
    ))
    .bind(property_id)
    .fetch_optional(pool)
    .await;

    observe("get_property", start, result)
}

/// Current owner of a listing, read fresh for ownership checks.
#[instrument(skip_all, name = "zameen.repo.get_property_owner")]
pub async fn get_owner_id(pool: &PgPool, property_id: i64) -> Result<Option<i64>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_scalar::<_, i64>("SELECT user_id FROM properties WHERE id = $1")
        .bind(property_id)
        .fetch_optional(pool)
        .await;

    observe("get_property_owner", start, result)
}

#[instrument(skip_all, name = "zameen.repo.create_property")]
pub async fn create<'e, E>(
    executor: E,
    owner_id: i64,
    property: &NewProperty,
) -> Result<PropertyRow, ApiError>
where
    E: PgExecutor<'e>,
{
    let start = Instant::now();
    let result = sqlx::query_as::<_, PropertyRow>(concat!(
        "INSERT INTO properties AS p ( \
            user_id, title, description, price, property_type, status, \
            bedrooms, bathrooms, area, address, city, state, zip_code \
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         RETURNING ",
        property_columns!()
    ))
    .bind(owner_id)
    .bind(&property.title)
    .bind(&property.description)
    .bind(property.price)
    .bind(property.property_type.as_str())
    .bind(property.status.as_str())
    .bind(property.bedrooms)
    .bind(property.bathrooms)
    .bind(property.area)
    .bind(&property.address)
    .bind(&property.city)
    .bind(&property.state)
    .bind(&property.zip_code)
    .fetch_one(executor)
    .await;

    observe("create_property", start, result)
}

/// Apply a partial update. Columns whose change is `None` keep their value.
///
/// Returns `None` if the listing does not exist.
#[instrument(skip_all, name = "zameen.repo.update_property")]
pub async fn update<'e, E>(
    executor: E,
    property_id: i64,
    changes: &PropertyChanges,
) -> Result<Option<PropertyRow>, ApiError>
where
    E: PgExecutor<'e>,
{
    let start = Instant::now();
    let result = sqlx::query_as::<_, PropertyRow>(concat!(
        "UPDATE properties AS p SET \
            title = COALESCE($2, p.title), \
            description = COALESCE($3, p.description), \
            price = COALESCE($4, p.price), \
            property_type = COALESCE($5, p.property_type), \
            status = COALESCE($6, p.status), \
            bedrooms = COALESCE($7, p.bedrooms), \
            bathrooms = COALESCE($8, p.bathrooms), \
            area = COALESCE($9, p.area), \
            address = COALESCE($10, p.address), \
            city = COALESCE($11, p.city), \
            state = COALESCE($12, p.state), \
            zip_code = COALESCE($13, p.zip_code), \
            updated_at = NOW() \
         WHERE p.id = $1 \
         RETURNING ",
        property_columns!()
    ))
    .bind(property_id)
    .bind(changes.title.as_deref())
    .bind(changes.description.as_deref())
    .bind(changes.price)
    .bind(changes.property_type.map(|t| t.as_str()))
    .bind(changes.status.map(|s| s.as_str()))
    .bind(changes.bedrooms)
    .bind(changes.bathrooms)
    .bind(changes.area)
    .bind(changes.address.as_deref())
    .bind(changes.city.as_deref())
    .bind(changes.state.as_deref())
    .bind(changes.zip_code.as_deref())
    .fetch_optional(executor)
    .await;

    observe("update_property", start, result)
}

/// Delete a listing; images, inquiries and favorites cascade.
#[instrument(skip_all, name = "zameen.repo.delete_property")]
pub async fn delete(pool: &PgPool, property_id: i64) -> Result<bool, ApiError> {
    let start = Instant::now();
    let result = sqlx::query("DELETE FROM properties WHERE id = $1")
        .bind(property_id)
        .execute(pool)
        .await;

    observe("delete_property", start, result).map(|r| r.rows_affected() > 0)
}
