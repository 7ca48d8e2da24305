//! Integration tests for admin user management.

use common::types::Role;
use reqwest::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use zameen_test_utils::TestApiServer;

#[sqlx::test(migrations = "../../migrations")]
async fn test_user_management_requires_admin(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let seller = server.register("seller@example.com", Role::Seller).await?;

    let list = server
        .client()
        .get(format!("{}/api/v1/users", server.url()))
        .header("Authorization", seller.bearer())
        .send()
        .await?;
    assert_eq!(list.status(), StatusCode::FORBIDDEN);

    let promote = server
        .client()
        .put(format!("{}/api/v1/users/{}", server.url(), seller.id))
        .header("Authorization", seller.bearer())
        .json(&json!({"role": "admin"}))
        .send()
        .await?;
    assert_eq!(promote.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_admin_lists_and_changes_roles(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let admin = server.create_admin("admin@example.com").await?;
    let buyer = server.register("buyer@example.com", Role::Buyer).await?;

    let users: serde_json::Value = server
        .client()
        .get(format!("{}/api/v1/users", server.url()))
        .header("Authorization", admin.bearer())
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(users.as_array().map(Vec::len), Some(2));

    let url = format!("{}/api/v1/users/{}", server.url(), buyer.id);
    let updated = server
        .client()
        .put(&url)
        .header("Authorization", admin.bearer())
        .json(&json!({"role": "seller"}))
        .send()
        .await?;
    assert_eq!(updated.status(), StatusCode::OK);

    let fetched: serde_json::Value = server
        .client()
        .get(&url)
        .header("Authorization", admin.bearer())
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(fetched["role"], "seller");

    let invalid = server
        .client()
        .put(&url)
        .header("Authorization", admin.bearer())
        .json(&json!({"role": "owner"}))
        .send()
        .await?;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_admin_delete_user(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let admin = server.create_admin("admin@example.com").await?;
    let buyer = server.register("buyer@example.com", Role::Buyer).await?;

    let self_delete = server
        .client()
        .delete(format!("{}/api/v1/users/{}", server.url(), admin.id))
        .header("Authorization", admin.bearer())
        .send()
        .await?;
    assert_eq!(self_delete.status(), StatusCode::BAD_REQUEST);

    let url = format!("{}/api/v1/users/{}", server.url(), buyer.id);
    let deleted = server
        .client()
        .delete(&url)
        .header("Authorization", admin.bearer())
        .send()
        .await?;
    assert_eq!(deleted.status(), StatusCode::OK);
    let body: serde_json::Value = deleted.json().await?;
    assert_eq!(body["message"], "User deleted successfully");

    let missing = server
        .client()
        .get(&url)
        .header("Authorization", admin.bearer())
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    Ok(())
}
