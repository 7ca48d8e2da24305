//! User repository.
//!
//! Password hashes are only ever read through [`get_by_email`], which the
//! login path needs; every other query returns the public [`User`] view.

use super::{is_unique_violation, observe};
use crate::errors::ApiError;
use crate::models::{User, UserRow};
use crate::observability::metrics::record_db_query;
use common::types::Role;
use sqlx::PgPool;
use std::time::Instant;
use tracing::instrument;

/// Get the full user record (including password hash) by email.
#[instrument(skip_all, name = "zameen.repo.get_user_by_email")]
pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, email, password_hash, phone, role, created_at, updated_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await;

    observe("get_user_by_email", start, result)
}

/// Get a user's public record by id.
#[instrument(skip_all, name = "zameen.repo.get_user")]
pub async fn get_by_id(pool: &PgPool, user_id: i64) -> Result<Option<User>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, phone, role, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await;

    observe("get_user", start, result)
}

/// Create a user.
///
/// # Errors
///
/// Returns `ApiError::Conflict` if the email is already registered.
#[instrument(skip_all, name = "zameen.repo.create_user")]
pub async fn create_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    phone: Option<&str>,
    role: Role,
) -> Result<User, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash, phone, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, email, phone, role, created_at
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(phone)
    .bind(role.as_str())
    .fetch_one(pool)
    .await;

    if let Err(e) = &result {
        if is_unique_violation(e, "users_email_unique") {
            record_db_query("create_user", "conflict", start.elapsed());
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }
    }

    observe("create_user", start, result)
}

/// List all users, newest first.
#[instrument(skip_all, name = "zameen.repo.list_users")]
pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, phone, role, created_at
        FROM users
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await;

    observe("list_users", start, result)
}

/// Change a user's role. Returns `None` if the user does not exist.
///
/// Tokens already issued keep the role they were issued with.
#[instrument(skip_all, name = "zameen.repo.update_user_role")]
pub async fn update_role(
    pool: &PgPool,
    user_id: i64,
    role: Role,
) -> Result<Option<User>, ApiError> {
    let start = Instant::now();
    let result = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET role = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, email, phone, role, created_at
        "#,
    )
    .bind(user_id)
    .bind(role.as_str())
    .fetch_optional(pool)
    .await;

    observe("update_user_role", start, result)
}

/// Delete a user and, by cascade, everything they own.
///
/// Returns `false` if no such user existed.
#[instrument(skip_all, name = "zameen.repo.delete_user")]
pub async fn delete_user(pool: &PgPool, user_id: i64) -> Result<bool, ApiError> {
    let start = Instant::now();
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await;

    observe("delete_user", start, result).map(|r| r.rows_affected() > 0)
}
