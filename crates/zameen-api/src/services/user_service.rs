//! Registration, login and account administration.

use super::{optional_text, require_text};
use crate::auth::{authorize, Policy};
use crate::crypto::{self, TokenCodec};
use crate::errors::ApiError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UpdateRoleRequest, User};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_token_issued;
use crate::repositories::users;
use common::jwt::ClaimSet;
use common::secret::ExposeSecret;
use common::types::Role;
use sqlx::PgPool;
use std::str::FromStr;
use tracing::instrument;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Register a new account and log it in.
///
/// # Steps
///
/// 1. Validate name, email shape and password length
/// 2. Resolve the requested role (default buyer, never admin)
/// 3. Hash the password at the configured bcrypt cost
/// 4. Insert the user (duplicate email is 409)
/// 5. Issue a token
#[instrument(skip_all, name = "zameen.service.register")]
pub async fn register(
    pool: &PgPool,
    codec: &TokenCodec,
    bcrypt_cost: u32,
    request: RegisterRequest,
) -> Result<AuthResponse, ApiError> {
    let name = require_text("name", Some(request.name.as_str()))?;
    let email = normalize_email(&request.email);

    if !is_valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email format".to_string()));
    }

    if request.password.expose_secret().len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let role = match optional_text(request.role.as_deref()) {
        None => Role::default(),
        Some(raw) => Role::from_str(&raw).map_err(ApiError::BadRequest)?,
    };
    if role.is_admin() {
        return Err(ApiError::BadRequest(
            "Admin accounts cannot be self-registered".to_string(),
        ));
    }

    let phone = optional_text(request.phone.as_deref());
    let password_hash = crypto::hash_password(request.password.expose_secret(), bcrypt_cost)?;

    let user = users::create_user(pool, &name, &email, &password_hash, phone.as_deref(), role)
        .await?;

    let token = codec.issue(user.id, role)?;
    record_token_issued("register");

    tracing::info!(
        target: "zameen.services.user",
        email = %hash_for_correlation(&email),
        role = %role,
        "User registered"
    );

    Ok(AuthResponse {
        message: "Registration successful".to_string(),
        token,
        user,
    })
}

/// Check credentials and issue a token.
///
/// Unknown emails and wrong passwords are indistinguishable to the caller,
/// both in the response and in the bcrypt work performed.
#[instrument(skip_all, name = "zameen.service.login")]
pub async fn login(
    pool: &PgPool,
    codec: &TokenCodec,
    request: LoginRequest,
) -> Result<AuthResponse, ApiError> {
    let email = normalize_email(&request.email);
    let password = request.password.expose_secret();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let Some(row) = users::get_by_email(pool, &email).await? else {
        crypto::verify_against_dummy(password);
        tracing::debug!(
            target: "zameen.services.user",
            email = %hash_for_correlation(&email),
            "Login failed"
        );
        return Err(ApiError::InvalidCredentials);
    };

    if !crypto::verify_password(password, &row.password_hash)? {
        tracing::debug!(
            target: "zameen.services.user",
            email = %hash_for_correlation(&email),
            "Login failed"
        );
        return Err(ApiError::InvalidCredentials);
    }

    let role = stored_role(&row.role)?;
    let token = codec.issue(row.id, role)?;
    record_token_issued("login");

    Ok(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: User::from(row),
    })
}

/// The caller's own record.
#[instrument(skip_all, name = "zameen.service.current_user")]
pub async fn current_user(pool: &PgPool, claims: &ClaimSet) -> Result<User, ApiError> {
    users::get_by_id(pool, claims.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

#[instrument(skip_all, name = "zameen.service.list_users")]
pub async fn list_users(pool: &PgPool, claims: &ClaimSet) -> Result<Vec<User>, ApiError> {
    authorize(claims, &Policy::role(Role::Admin))?;
    users::list_users(pool).await
}

#[instrument(skip_all, name = "zameen.service.get_user")]
pub async fn get_user(pool: &PgPool, claims: &ClaimSet, user_id: i64) -> Result<User, ApiError> {
    authorize(claims, &Policy::role(Role::Admin))?;
    users::get_by_id(pool, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Change another user's role.
///
/// Tokens the user already holds keep their old role until they expire.
#[instrument(skip_all, name = "zameen.service.update_role")]
pub async fn update_role(
    pool: &PgPool,
    claims: &ClaimSet,
    user_id: i64,
    request: UpdateRoleRequest,
) -> Result<User, ApiError> {
    authorize(claims, &Policy::role(Role::Admin))?;

    let raw = require_text("role", request.role.as_deref())?;
    let role = Role::from_str(&raw).map_err(ApiError::BadRequest)?;

    let user = users::update_role(pool, user_id, role)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(target: "zameen.services.user", role = %role, "User role updated");
    Ok(user)
}

#[instrument(skip_all, name = "zameen.service.delete_user")]
pub async fn delete_user(pool: &PgPool, claims: &ClaimSet, user_id: i64) -> Result<(), ApiError> {
    authorize(claims, &Policy::role(Role::Admin))?;

    if user_id == claims.user_id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    if !users::delete_user(pool, user_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(target: "zameen.services.user", "User deleted");
    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic shape check: `local@domain.tld` with no empty parts.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return false;
    }

    let mut labels = domain.split('.');
    let count = labels.clone().count();
    count >= 2 && labels.all(|label| !label.is_empty())
}

fn stored_role(raw: &str) -> Result<Role, ApiError> {
    Role::from_str(raw).map_err(|e| {
        tracing::error!(target: "zameen.services.user", error = %e, "Stored role is invalid");
        ApiError::Internal
    })
}
