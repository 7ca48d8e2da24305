//! Property listing endpoints.
//!
//! Search and detail are public; everything else runs behind
//! `require_auth` and applies a role or ownership policy in the service.

use super::{parse_json, parse_path};
use crate::errors::ApiError;
use crate::models::{
    CreatePropertyRequest, MessageResponse, PropertyCreatedResponse, PropertyDetail,
    PropertyFilters, PropertySummary, UpdatePropertyRequest,
};
use crate::routes::AppState;
use crate::services::property_service;
use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use common::jwt::ClaimSet;
use std::sync::Arc;
use tracing::instrument;

/// `GET /api/v1/properties?city=&property_type=&min_price=&max_price=&bedrooms=&status=`
#[instrument(skip_all, name = "zameen.properties.search")]
pub async fn search_properties(
    State(state): State<Arc<AppState>>,
    filters: Result<Query<PropertyFilters>, QueryRejection>,
) -> Result<Json<Vec<PropertySummary>>, ApiError> {
    let Query(filters) = filters.map_err(|e| {
        tracing::debug!(target: "zameen.handlers", error = %e, "Invalid search query");
        ApiError::BadRequest("Invalid search filters".to_string())
    })?;
    Ok(Json(property_service::search(&state.pool, filters).await?))
}

#[instrument(skip_all, name = "zameen.properties.get")]
pub async fn get_property(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<PropertyDetail>, ApiError> {
    let property_id = parse_path(path)?;
    Ok(Json(
        property_service::get_detail(&state.pool, property_id).await?,
    ))
}

/// `GET /api/v1/me/properties`
#[instrument(skip_all, name = "zameen.properties.mine")]
pub async fn my_properties(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
) -> Result<Json<Vec<PropertySummary>>, ApiError> {
    Ok(Json(property_service::list_mine(&state.pool, &claims).await?))
}

/// `POST /api/v1/properties` (seller or admin).
#[instrument(skip_all, name = "zameen.properties.create")]
pub async fn create_property(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    body: Bytes,
) -> Result<(StatusCode, Json<PropertyCreatedResponse>), ApiError> {
    let request: CreatePropertyRequest = parse_json(&body)?;
    let created = property_service::create(&state.pool, &claims, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/v1/properties/:id` (owner or admin).
#[instrument(skip_all, name = "zameen.properties.update")]
pub async fn update_property(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    path: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let property_id = parse_path(path)?;
    let request: UpdatePropertyRequest = parse_json(&body)?;
    property_service::update(&state.pool, &claims, property_id, request).await?;
    Ok(Json(MessageResponse::new("Property updated successfully")))
}

/// `DELETE /api/v1/properties/:id` (owner or admin).
#[instrument(skip_all, name = "zameen.properties.delete")]
pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let property_id = parse_path(path)?;
    property_service::delete(&state.pool, &claims, property_id).await?;
    Ok(Json(MessageResponse::new("Property deleted successfully")))
}

/// `DELETE /api/v1/properties/:id/images/:image_id` (owner or admin).
#[instrument(skip_all, name = "zameen.properties.delete_image")]
pub async fn delete_property_image(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (property_id, image_id) = parse_path(path)?;
    property_service::delete_image(&state.pool, &claims, property_id, image_id).await?;
    Ok(Json(MessageResponse::new("Image deleted successfully")))
}
