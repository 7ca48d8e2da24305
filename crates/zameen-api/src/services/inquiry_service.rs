//! Buyer inquiries on listings.
//!
//! An inquiry is visible to, and its status can be changed by, the user who
//! sent it, the owner of the listing it concerns, and admins.

use crate::auth::{authorize, Policy};
use crate::errors::ApiError;
use crate::models::{
    CreateInquiryRequest, InquiryCreatedResponse, InquiryRow, InquiryStatus, InquiryView,
    UpdateInquiryRequest,
};
use crate::repositories::{inquiries, properties};
use common::jwt::ClaimSet;
use sqlx::PgPool;
use std::str::FromStr;
use tracing::instrument;

#[instrument(skip_all, name = "zameen.service.create_inquiry")]
pub async fn create(
    pool: &PgPool,
    claims: &ClaimSet,
    request: CreateInquiryRequest,
) -> Result<InquiryCreatedResponse, ApiError> {
    let property_id = request
        .property_id
        .ok_or_else(|| ApiError::BadRequest("property_id is required".to_string()))?;

    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message is required".to_string()));
    }

    if properties::get_owner_id(pool, property_id).await?.is_none() {
        return Err(ApiError::NotFound("Property not found".to_string()));
    }

    let inquiry = inquiries::create(pool, claims.user_id, property_id, message).await?;

    tracing::info!(
        target: "zameen.services.inquiry",
        inquiry_id = inquiry.id,
        property_id,
        "Inquiry sent"
    );

    Ok(InquiryCreatedResponse {
        message: "Inquiry sent successfully".to_string(),
        inquiry_id: inquiry.id,
    })
}

/// Admins see every inquiry; everyone else sees the ones they sent.
#[instrument(skip_all, name = "zameen.service.list_inquiries")]
pub async fn list(pool: &PgPool, claims: &ClaimSet) -> Result<Vec<InquiryView>, ApiError> {
    if claims.role.is_admin() {
        inquiries::list_all(pool).await
    } else {
        inquiries::list_by_user(pool, claims.user_id).await
    }
}

/// Inquiries the caller sent plus those received on their listings.
#[instrument(skip_all, name = "zameen.service.my_inquiries")]
pub async fn list_mine(pool: &PgPool, claims: &ClaimSet) -> Result<Vec<InquiryView>, ApiError> {
    inquiries::list_involving(pool, claims.user_id).await
}

#[instrument(skip_all, name = "zameen.service.get_inquiry", fields(inquiry_id = inquiry_id))]
pub async fn get(pool: &PgPool, claims: &ClaimSet, inquiry_id: i64) -> Result<InquiryView, ApiError> {
    let view = fetch(pool, inquiry_id).await?;
    authorize(claims, &participants(&view))?;
    Ok(view)
}

#[instrument(skip_all, name = "zameen.service.update_inquiry", fields(inquiry_id = inquiry_id))]
pub async fn update_status(
    pool: &PgPool,
    claims: &ClaimSet,
    inquiry_id: i64,
    request: UpdateInquiryRequest,
) -> Result<InquiryRow, ApiError> {
    let raw = request
        .status
        .ok_or_else(|| ApiError::BadRequest("status is required".to_string()))?;
    let status = InquiryStatus::from_str(raw.trim()).map_err(ApiError::BadRequest)?;

    let view = fetch(pool, inquiry_id).await?;
    authorize(claims, &participants(&view))?;

    let updated = inquiries::update_status(pool, inquiry_id, status)
        .await?
        .ok_or_else(inquiry_not_found)?;

    tracing::info!(
        target: "zameen.services.inquiry",
        inquiry_id,
        status = %status,
        "Inquiry status updated"
    );

    Ok(updated)
}

async fn fetch(pool: &PgPool, inquiry_id: i64) -> Result<InquiryView, ApiError> {
    inquiries::get_view(pool, inquiry_id)
        .await?
        .ok_or_else(inquiry_not_found)
}

/// Sender or listing owner (admins pass ownership checks).
fn participants(view: &InquiryView) -> Policy {
    Policy::authenticated()
        .owned_by(view.inquiry.user_id)
        .owned_by(view.property_owner_id)
}

fn inquiry_not_found() -> ApiError {
    ApiError::NotFound("Inquiry not found".to_string())
}
