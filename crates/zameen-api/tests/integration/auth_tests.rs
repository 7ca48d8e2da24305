//! Integration tests for registration, login and the current-user endpoint.
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use common::types::Role;
use reqwest::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use zameen_test_utils::{TestApiServer, TEST_PASSWORD};

// ============================================================================
// Registration
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_happy_path(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/auth/register", server.url()))
        .json(&json!({
            "name": "Ayesha",
            "email": "  Ayesha@Example.com ",
            "password": "password123",
            "phone": "0300-1234567",
            "role": "seller"
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"], "Registration successful");
    assert_eq!(body["user"]["email"], "ayesha@example.com");
    assert_eq!(body["user"]["role"], "seller");
    assert!(body["user"].get("password_hash").is_none());

    let token = body["token"].as_str().unwrap_or_default();
    let claims = server.codec().verify(token)?;
    assert_eq!(claims.role, Role::Seller);
    assert_eq!(Some(claims.user_id), body["user"]["id"].as_i64());
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_defaults_to_buyer(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/auth/register", server.url()))
        .json(&json!({
            "name": "Bilal",
            "email": "bilal@example.com",
            "password": "password123"
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["user"]["role"], "buyer");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_duplicate_email_conflicts(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    server.register("dup@example.com", Role::Buyer).await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/auth/register", server.url()))
        .json(&json!({
            "name": "Again",
            "email": "DUP@example.com",
            "password": "password123"
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "CONFLICT");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_invalid_input_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let url = format!("{}/api/v1/auth/register", server.url());

    let cases = [
        json!({"name": "", "email": "a@example.com", "password": "password123"}),
        json!({"name": "A", "email": "not-an-email", "password": "password123"}),
        json!({"name": "A", "email": "a@example.com", "password": "short"}),
        json!({"name": "A", "email": "a@example.com", "password": "password123", "role": "landlord"}),
        json!({"name": "A", "email": "a@example.com", "password": "password123", "role": "admin"}),
    ];

    for case in cases {
        let response = server.client().post(&url).json(&case).send().await?;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "expected 400 for {}",
            case
        );
    }
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_malformed_json_is_bad_request(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/auth/register", server.url()))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

// ============================================================================
// Login
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_login_happy_path(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let user = server.register("login@example.com", Role::Seller).await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({"email": "Login@Example.com", "password": TEST_PASSWORD}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["id"].as_i64(), Some(user.id));

    let claims = server
        .codec()
        .verify(body["token"].as_str().unwrap_or_default())?;
    assert_eq!(claims.user_id, user.id);
    assert_eq!(claims.role, Role::Seller);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_login_wrong_password_and_unknown_email_look_alike(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    server.register("known@example.com", Role::Buyer).await?;
    let url = format!("{}/api/v1/auth/login", server.url());

    let wrong = server
        .client()
        .post(&url)
        .json(&json!({"email": "known@example.com", "password": "wrong-password"}))
        .send()
        .await?;
    let unknown = server
        .client()
        .post(&url)
        .json(&json!({"email": "nobody@example.com", "password": "wrong-password"}))
        .send()
        .await?;

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    let wrong_body: serde_json::Value = wrong.json().await?;
    let unknown_body: serde_json::Value = unknown.json().await?;
    assert_eq!(wrong_body, unknown_body);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_login_missing_fields_is_bad_request(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({"email": "x@example.com"}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

// ============================================================================
// Current user
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_me_returns_profile(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let user = server.register("me@example.com", Role::Buyer).await?;

    let response = server
        .client()
        .get(format!("{}/api/v1/me", server.url()))
        .header("Authorization", user.bearer())
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["id"].as_i64(), Some(user.id));
    assert_eq!(body["email"], "me@example.com");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_me_without_token_is_unauthorized(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;

    let response = server
        .client()
        .get(format!("{}/api/v1/me", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_me_after_account_deleted_is_not_found(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let user = server.register("gone@example.com", Role::Buyer).await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(server.pool())
        .await?;

    let response = server
        .client()
        .get(format!("{}/api/v1/me", server.url()))
        .header("Authorization", user.bearer())
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
