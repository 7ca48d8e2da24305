//! Inquiry repository.

use super::observe;
use crate::errors::ApiError;
use crate::models::{InquiryRow, InquiryStatus, InquiryView};
use sqlx::PgPool;
use std::time::Instant;
use tracing::instrument;

/// Inquiry joined with the listing title/owner and the inquirer.
macro_rules! view_select {
    () => {
        "SELECT i.id, i.user_id, i.property_id, i.message, i.status, \
                i.created_at, i.updated_at, \
                p.title AS property_title, p.user_id AS property_owner_id, \
                u.name AS user_name, u.email AS user_email \
         FROM inquiries i \
         JOIN properties p ON i.property_id = p.id \
         JOIN users u ON i.user_id = u.id"
    };
}

/// Record a new inquiry with status `pending`.
#[instrument(skip_all, name = "zameen.repo.create_inquiry")]
pub async fn create(
    pool: &PgPool,
    user_id: i64,
    property_id: i64,
    message: &str,
) -> Result<InquiryRow, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, InquiryRow>(
        r#"
        INSERT INTO inquiries (user_id, property_id, message, status)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, property_id, message, status, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(property_id)
    .bind(message)
    .bind(InquiryStatus::Pending.as_str())
    .fetch_one(pool)
    .await;

    observe("create_inquiry", start, result)
}

/// Every inquiry, newest first.
#[instrument(skip_all, name = "zameen.repo.list_inquiries")]
pub async fn list_all(pool: &PgPool) -> Result<Vec<InquiryView>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, InquiryView>(concat!(
        view_select!(),
        " ORDER BY i.created_at DESC, i.id DESC"
    ))
    .fetch_all(pool)
    .await;

    observe("list_inquiries", start, result)
}

/// Inquiries sent by `user_id`, newest first.
#[instrument(skip_all, name = "zameen.repo.list_inquiries_by_user")]
pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<InquiryView>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, InquiryView>(concat!(
        view_select!(),
        " WHERE i.user_id = $1 ORDER BY i.created_at DESC, i.id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await;

    observe("list_inquiries_by_user", start, result)
}

/// Inquiries sent by `user_id` or received on listings they own.
#[instrument(skip_all, name = "zameen.repo.list_inquiries_involving")]
pub async fn list_involving(pool: &PgPool, user_id: i64) -> Result<Vec<InquiryView>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, InquiryView>(concat!(
        view_select!(),
        " WHERE i.user_id = $1 OR p.user_id = $1 ORDER BY i.created_at DESC, i.id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await;

    observe("list_inquiries_involving", start, result)
}

#[instrument(skip_all, name = "zameen.repo.get_inquiry")]
pub async fn get_view(pool: &PgPool, inquiry_id: i64) -> Result<Option<InquiryView>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, InquiryView>(concat!(view_select!(), " WHERE i.id = $1"))
        .bind(inquiry_id)
        .fetch_optional(pool)
        .await;

    observe("get_inquiry", start, result)
}

/// Set an inquiry's status. Returns `None` if it does not exist.
#[instrument(skip_all, name = "zameen.repo.update_inquiry_status")]
pub async fn update_status(
    pool: &PgPool,
    inquiry_id: i64,
    status: InquiryStatus,
) -> Result<Option<InquiryRow>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, InquiryRow>(
        r#"
        UPDATE inquiries
        SET status = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, user_id, property_id, message, status, created_at, updated_at
        "#,
    )
    .bind(inquiry_id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await;

    observe("update_inquiry_status", start, result)
}
