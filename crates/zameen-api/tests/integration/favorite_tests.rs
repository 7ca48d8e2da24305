//! Integration tests for per-user favorites.

use common::types::Role;
use reqwest::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use zameen_test_utils::TestApiServer;

#[sqlx::test(migrations = "../../migrations")]
async fn test_favorite_lifecycle(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let seller = server.register("seller@example.com", Role::Seller).await?;
    let buyer = server.register("buyer@example.com", Role::Buyer).await?;
    let property_id = server
        .create_property(
            &seller,
            "Bungalow",
            "Lahore",
            30_000_000.0,
            &["https://img/front.jpg", "https://img/back.jpg"],
        )
        .await?;
    let favorites_url = format!("{}/api/v1/favorites", server.url());
    let item_url = format!("{}/{}", favorites_url, property_id);

    let before: serde_json::Value = server
        .client()
        .get(&item_url)
        .header("Authorization", buyer.bearer())
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(before["is_favorite"], false);

    let added = server
        .client()
        .post(&favorites_url)
        .header("Authorization", buyer.bearer())
        .json(&json!({"property_id": property_id}))
        .send()
        .await?;
    assert_eq!(added.status(), StatusCode::CREATED);

    let repeat = server
        .client()
        .post(&favorites_url)
        .header("Authorization", buyer.bearer())
        .json(&json!({"property_id": property_id}))
        .send()
        .await?;
    assert_eq!(repeat.status(), StatusCode::CONFLICT);

    let list: serde_json::Value = server
        .client()
        .get(&favorites_url)
        .header("Authorization", buyer.bearer())
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["id"].as_i64(), Some(property_id));
    assert_eq!(list[0]["images"][0], "https://img/front.jpg");
    assert_eq!(list[0]["images"].as_array().map(Vec::len), Some(2));

    let removed = server
        .client()
        .delete(&item_url)
        .header("Authorization", buyer.bearer())
        .send()
        .await?;
    assert_eq!(removed.status(), StatusCode::OK);

    let again = server
        .client()
        .delete(&item_url)
        .header("Authorization", buyer.bearer())
        .send()
        .await?;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_favorites_are_per_user(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let seller = server.register("seller@example.com", Role::Seller).await?;
    let first = server.register("first@example.com", Role::Buyer).await?;
    let second = server.register("second@example.com", Role::Buyer).await?;
    let property_id = server
        .create_property(&seller, "Flat", "Karachi", 8_000_000.0, &[])
        .await?;

    server
        .client()
        .post(format!("{}/api/v1/favorites", server.url()))
        .header("Authorization", first.bearer())
        .json(&json!({"property_id": property_id}))
        .send()
        .await?;

    let list: serde_json::Value = server
        .client()
        .get(format!("{}/api/v1/favorites", server.url()))
        .header("Authorization", second.bearer())
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(list.as_array().map(Vec::len), Some(0));
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_favorite_unknown_property_is_not_found(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let buyer = server.register("buyer@example.com", Role::Buyer).await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/favorites", server.url()))
        .header("Authorization", buyer.bearer())
        .json(&json!({"property_id": 424242}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
