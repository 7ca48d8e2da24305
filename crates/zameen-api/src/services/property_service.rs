//! Property listings and their images.

use super::{optional_text, require_text};
use crate::auth::{authorize, Policy};
use crate::errors::ApiError;
use crate::models::{
    CreatePropertyRequest, NewProperty, PropertyChanges, PropertyCreatedResponse, PropertyDetail,
    PropertyFilters, PropertySearch, PropertyStatus, PropertySummary, PropertyType,
    UpdatePropertyRequest,
};
use crate::repositories::{properties, property_images};
use common::jwt::ClaimSet;
use common::types::Role;
use sqlx::PgPool;
use std::str::FromStr;
use tracing::instrument;

/// Roles allowed to publish listings.
const PUBLISHER_ROLES: [Role; 2] = [Role::Seller, Role::Admin];

/// Public search.
#[instrument(skip_all, name = "zameen.service.search_properties")]
pub async fn search(
    pool: &PgPool,
    filters: PropertyFilters,
) -> Result<Vec<PropertySummary>, ApiError> {
    let search = validate_filters(filters)?;
    properties::search(pool, &search).await
}

/// Public detail view with owner contact and images.
#[instrument(skip_all, name = "zameen.service.get_property", fields(property_id = property_id))]
pub async fn get_detail(pool: &PgPool, property_id: i64) -> Result<PropertyDetail, ApiError> {
    let listing = properties::get_with_owner(pool, property_id)
        .await?
        .ok_or_else(property_not_found)?;
    let images = property_images::list_for_property(pool, property_id).await?;

    Ok(PropertyDetail { listing, images })
}

/// Listings owned by the caller.
#[instrument(skip_all, name = "zameen.service.my_properties")]
pub async fn list_mine(
    pool: &PgPool,
    claims: &ClaimSet,
) -> Result<Vec<PropertySummary>, ApiError> {
    properties::list_by_owner(pool, claims.user_id).await
}

/// Publish a listing owned by the caller, with its images, atomically.
#[instrument(skip_all, name = "zameen.service.create_property")]
pub async fn create(
    pool: &PgPool,
    claims: &ClaimSet,
    request: CreatePropertyRequest,
) -> Result<PropertyCreatedResponse, ApiError> {
    authorize(claims, &Policy::any_role(&PUBLISHER_ROLES))?;

    let images = validate_images(request.images.as_deref())?.unwrap_or_default();
    let property = validate_new(request)?;

    let mut tx = pool.begin().await?;
    let created = properties::create(&mut *tx, claims.user_id, &property).await?;
    property_images::insert_images(&mut *tx, created.id, &images).await?;
    tx.commit().await?;

    tracing::info!(
        target: "zameen.services.property",
        property_id = created.id,
        images = images.len(),
        "Property created"
    );

    Ok(PropertyCreatedResponse {
        message: "Property created successfully".to_string(),
        property_id: created.id,
    })
}

/// Apply a partial update. When `images` is present the image set is
/// replaced in the same transaction.
#[instrument(skip_all, name = "zameen.service.update_property", fields(property_id = property_id))]
pub async fn update(
    pool: &PgPool,
    claims: &ClaimSet,
    property_id: i64,
    request: UpdatePropertyRequest,
) -> Result<(), ApiError> {
    let owner_id = properties::get_owner_id(pool, property_id)
        .await?
        .ok_or_else(property_not_found)?;
    authorize(claims, &Policy::authenticated().owned_by(owner_id))?;

    let images = validate_images(request.images.as_deref())?;
    let changes = validate_changes(request)?;

    if changes.is_empty() && images.is_none() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let mut tx = pool.begin().await?;
    properties::update(&mut *tx, property_id, &changes)
        .await?
        .ok_or_else(property_not_found)?;
    if let Some(images) = &images {
        property_images::delete_for_property(&mut *tx, property_id).await?;
        property_images::insert_images(&mut *tx, property_id, images).await?;
    }
    tx.commit().await?;

    tracing::info!(target: "zameen.services.property", property_id, "Property updated");
    Ok(())
}

#[instrument(skip_all, name = "zameen.service.delete_property", fields(property_id = property_id))]
pub async fn delete(pool: &PgPool, claims: &ClaimSet, property_id: i64) -> Result<(), ApiError> {
    let owner_id = properties::get_owner_id(pool, property_id)
        .await?
        .ok_or_else(property_not_found)?;
    authorize(claims, &Policy::authenticated().owned_by(owner_id))?;

    if !properties::delete(pool, property_id).await? {
        return Err(property_not_found());
    }

    tracing::info!(target: "zameen.services.property", property_id, "Property deleted");
    Ok(())
}

/// Remove one image. Deleting the primary image promotes the next one.
#[instrument(skip_all, name = "zameen.service.delete_property_image", fields(property_id = property_id, image_id = image_id))]
pub async fn delete_image(
    pool: &PgPool,
    claims: &ClaimSet,
    property_id: i64,
    image_id: i64,
) -> Result<(), ApiError> {
    let owner_id = properties::get_owner_id(pool, property_id)
        .await?
        .ok_or_else(property_not_found)?;
    authorize(claims, &Policy::authenticated().owned_by(owner_id))?;

    let mut tx = pool.begin().await?;
    let was_primary = property_images::delete_image(&mut *tx, property_id, image_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))?;
    if was_primary {
        property_images::promote_first(&mut *tx, property_id).await?;
    }
    tx.commit().await?;

    Ok(())
}

fn property_not_found() -> ApiError {
    ApiError::NotFound("Property not found".to_string())
}

fn parse_type(raw: &str) -> Result<PropertyType, ApiError> {
    PropertyType::from_str(raw.trim()).map_err(ApiError::BadRequest)
}

fn parse_status(raw: &str) -> Result<PropertyStatus, ApiError> {
    PropertyStatus::from_str(raw.trim()).map_err(ApiError::BadRequest)
}

fn check_price(price: f64) -> Result<f64, ApiError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(ApiError::BadRequest("price must be greater than 0".to_string()))
    }
}

fn check_bound(field: &str, value: Option<f64>) -> Result<Option<f64>, ApiError> {
    match value {
        Some(v) if !v.is_finite() => Err(ApiError::BadRequest(format!(
            "{field} must be a finite number"
        ))),
        other => Ok(other),
    }
}

fn check_count(field: &str, value: Option<i32>) -> Result<Option<i32>, ApiError> {
    match value {
        Some(v) if v < 0 => Err(ApiError::BadRequest(format!("{field} must not be negative"))),
        other => Ok(other),
    }
}

fn check_area(value: Option<f64>) -> Result<Option<f64>, ApiError> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => {
            Err(ApiError::BadRequest("area must be greater than 0".to_string()))
        }
        other => Ok(other),
    }
}

/// Trimmed image URLs, or `None` when the field was absent.
fn validate_images(images: Option<&[String]>) -> Result<Option<Vec<String>>, ApiError> {
    let Some(images) = images else {
        return Ok(None);
    };

    images
        .iter()
        .map(|url| {
            let url = url.trim();
            if url.is_empty() {
                Err(ApiError::BadRequest("image URL must not be empty".to_string()))
            } else {
                Ok(url.to_string())
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn validate_filters(filters: PropertyFilters) -> Result<PropertySearch, ApiError> {
    let search = PropertySearch {
        city: optional_text(filters.city.as_deref()),
        property_type: optional_text(filters.property_type.as_deref())
            .map(|t| parse_type(&t))
            .transpose()?,
        min_price: check_bound("min_price", filters.min_price)?,
        max_price: check_bound("max_price", filters.max_price)?,
        bedrooms: filters.bedrooms,
        status: optional_text(filters.status.as_deref())
            .map(|s| parse_status(&s))
            .transpose()?,
    };

    if let (Some(min), Some(max)) = (search.min_price, search.max_price) {
        if min > max {
            return Err(ApiError::BadRequest(
                "min_price must not exceed max_price".to_string(),
            ));
        }
    }

    Ok(search)
}

fn validate_new(request: CreatePropertyRequest) -> Result<NewProperty, ApiError> {
    let price = request
        .price
        .ok_or_else(|| ApiError::BadRequest("price is required".to_string()))?;

    Ok(NewProperty {
        title: require_text("title", request.title.as_deref())?,
        description: require_text("description", request.description.as_deref())?,
        price: check_price(price)?,
        property_type: parse_type(&require_text(
            "property_type",
            request.property_type.as_deref(),
        )?)?,
        status: optional_text(request.status.as_deref())
            .map(|s| parse_status(&s))
            .transpose()?
            .unwrap_or_default(),
        bedrooms: check_count("bedrooms", request.bedrooms)?,
        bathrooms: check_count("bathrooms", request.bathrooms)?,
        area: check_area(request.area)?,
        address: require_text("address", request.address.as_deref())?,
        city: require_text("city", request.city.as_deref())?,
        state: require_text("state", request.state.as_deref())?,
        zip_code: require_text("zip_code", request.zip_code.as_deref())?,
    })
}

fn validate_changes(request: UpdatePropertyRequest) -> Result<PropertyChanges, ApiError> {
    // A present but blank required field is an error, not "unchanged".
    let text = |field: &str, value: Option<String>| -> Result<Option<String>, ApiError> {
        value
            .map(|v| require_text(field, Some(v.as_str())))
            .transpose()
    };

    Ok(PropertyChanges {
        title: text("title", request.title)?,
        description: text("description", request.description)?,
        price: request.price.map(check_price).transpose()?,
        property_type: request
            .property_type
            .as_deref()
            .map(parse_type)
            .transpose()?,
        status: request.status.as_deref().map(parse_status).transpose()?,
        bedrooms: check_count("bedrooms", request.bedrooms)?,
        bathrooms: check_count("bathrooms", request.bathrooms)?,
        area: check_area(request.area)?,
        address: text("address", request.address)?,
        city: text("city", request.city)?,
        state: text("state", request.state)?,
        zip_code: text("zip_code", request.zip_code)?,
    })
}
