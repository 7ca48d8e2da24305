//! Inquiry endpoints. All require authentication.

use super::{parse_json, parse_path};
use crate::errors::ApiError;
use crate::models::{
    CreateInquiryRequest, InquiryCreatedResponse, InquiryRow, InquiryView, UpdateInquiryRequest,
};
use crate::routes::AppState;
use crate::services::inquiry_service;
use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use common::jwt::ClaimSet;
use std::sync::Arc;
use tracing::instrument;

#[instrument(skip_all, name = "zameen.inquiries.create")]
pub async fn create_inquiry(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    body: Bytes,
) -> Result<(StatusCode, Json<InquiryCreatedResponse>), ApiError> {
    let request: CreateInquiryRequest = parse_json(&body)?;
    let created = inquiry_service::create(&state.pool, &claims, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/v1/inquiries`: every inquiry for admins, own inquiries otherwise.
#[instrument(skip_all, name = "zameen.inquiries.list")]
pub async fn list_inquiries(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
) -> Result<Json<Vec<InquiryView>>, ApiError> {
    Ok(Json(inquiry_service::list(&state.pool, &claims).await?))
}

/// `GET /api/v1/me/inquiries`: sent and received.
#[instrument(skip_all, name = "zameen.inquiries.mine")]
pub async fn my_inquiries(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
) -> Result<Json<Vec<InquiryView>>, ApiError> {
    Ok(Json(inquiry_service::list_mine(&state.pool, &claims).await?))
}

#[instrument(skip_all, name = "zameen.inquiries.get")]
pub async fn get_inquiry(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<InquiryView>, ApiError> {
    let inquiry_id = parse_path(path)?;
    Ok(Json(
        inquiry_service::get(&state.pool, &claims, inquiry_id).await?,
    ))
}

#[instrument(skip_all, name = "zameen.inquiries.update")]
pub async fn update_inquiry(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    path: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<Json<InquiryRow>, ApiError> {
    let inquiry_id = parse_path(path)?;
    let request: UpdateInquiryRequest = parse_json(&body)?;
    Ok(Json(
        inquiry_service::update_status(&state.pool, &claims, inquiry_id, request).await?,
    ))
}
