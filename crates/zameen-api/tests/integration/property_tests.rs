//! Integration tests for listing search, detail and owner management.

use common::types::Role;
use reqwest::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use zameen_test_utils::TestApiServer;

// ============================================================================
// Public browsing
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_search_is_public_and_filters(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let seller = server.register("seller@example.com", Role::Seller).await?;
    server
        .create_property(&seller, "Lahore villa", "Lahore", 25_000_000.0, &["https://img/1.jpg"])
        .await?;
    server
        .create_property(&seller, "Karachi flat", "Karachi", 9_000_000.0, &[])
        .await?;

    let all: serde_json::Value = server
        .client()
        .get(format!("{}/api/v1/properties", server.url()))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(all.as_array().map(Vec::len), Some(2));
    // Newest first
    assert_eq!(all[0]["title"], "Karachi flat");
    assert_eq!(all[1]["primary_image"], "https://img/1.jpg");
    assert_eq!(all[1]["owner_name"], "Test User");

    let lahore: serde_json::Value = server
        .client()
        .get(format!("{}/api/v1/properties?city=lah", server.url()))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(lahore.as_array().map(Vec::len), Some(1));
    assert_eq!(lahore[0]["city"], "Lahore");

    let cheap: serde_json::Value = server
        .client()
        .get(format!("{}/api/v1/properties?max_price=10000000", server.url()))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(cheap.as_array().map(Vec::len), Some(1));
    assert_eq!(cheap[0]["title"], "Karachi flat");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_search_invalid_filters_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;

    for query in [
        "min_price=abc",
        "property_type=castle",
        "min_price=500&max_price=100",
        "status=demolished",
        "min_price=NaN",
        "max_price=inf",
    ] {
        let response = server
            .client()
            .get(format!("{}/api/v1/properties?{}", server.url(), query))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "query {query}");
    }
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_get_property_detail(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let seller = server.register("owner@example.com", Role::Seller).await?;
    let id = server
        .create_property(
            &seller,
            "Plot",
            "Islamabad",
            4_000_000.0,
            &["https://img/a.jpg", "https://img/b.jpg"],
        )
        .await?;

    let response = server
        .client()
        .get(format!("{}/api/v1/properties/{}", server.url(), id))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["id"].as_i64(), Some(id));
    assert_eq!(body["owner_email"], "owner@example.com");
    assert_eq!(body["images"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["images"][0]["image_url"], "https://img/a.jpg");
    assert_eq!(body["images"][0]["is_primary"], true);
    assert_eq!(body["images"][1]["is_primary"], false);

    let missing = server
        .client()
        .get(format!("{}/api/v1/properties/{}", server.url(), id + 100))
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    Ok(())
}

// ============================================================================
// Owner management
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_requires_auth_and_publisher_role(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let buyer = server.register("buyer@example.com", Role::Buyer).await?;
    let body = json!({"title": "Nope", "price": 1.0});

    let anonymous = server
        .client()
        .post(format!("{}/api/v1/properties", server.url()))
        .json(&body)
        .send()
        .await?;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let as_buyer = server
        .client()
        .post(format!("{}/api/v1/properties", server.url()))
        .header("Authorization", buyer.bearer())
        .json(&body)
        .send()
        .await?;
    assert_eq!(as_buyer.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_validation(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let seller = server.register("seller@example.com", Role::Seller).await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/properties", server.url()))
        .header("Authorization", seller.bearer())
        .json(&json!({
            "title": "Negative",
            "description": "d",
            "price": -5.0,
            "property_type": "house",
            "address": "a",
            "city": "c",
            "state": "s",
            "zip_code": "z"
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_and_delete_by_owner(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let seller = server.register("seller@example.com", Role::Seller).await?;
    let other = server.register("other@example.com", Role::Seller).await?;
    let id = server
        .create_property(&seller, "Flat", "Multan", 3_000_000.0, &["https://img/old.jpg"])
        .await?;
    let url = format!("{}/api/v1/properties/{}", server.url(), id);

    let denied = server
        .client()
        .put(&url)
        .header("Authorization", other.bearer())
        .json(&json!({"price": 1.0}))
        .send()
        .await?;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let empty = server
        .client()
        .put(&url)
        .header("Authorization", seller.bearer())
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let updated = server
        .client()
        .put(&url)
        .header("Authorization", seller.bearer())
        .json(&json!({
            "price": 3_500_000.0,
            "status": "pending",
            "images": ["https://img/new1.jpg", "https://img/new2.jpg"]
        }))
        .send()
        .await?;
    assert_eq!(updated.status(), StatusCode::OK);

    let detail: serde_json::Value = server.client().get(&url).send().await?.json().await?;
    assert_eq!(detail["price"].as_f64(), Some(3_500_000.0));
    assert_eq!(detail["status"], "pending");
    assert_eq!(detail["title"], "Flat");
    assert_eq!(detail["images"].as_array().map(Vec::len), Some(2));
    assert_eq!(detail["images"][0]["image_url"], "https://img/new1.jpg");

    let mine: serde_json::Value = server
        .client()
        .get(format!("{}/api/v1/me/properties", server.url()))
        .header("Authorization", seller.bearer())
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));

    let deleted = server
        .client()
        .delete(&url)
        .header("Authorization", seller.bearer())
        .send()
        .await?;
    assert_eq!(deleted.status(), StatusCode::OK);

    let gone = server.client().get(&url).send().await?;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_admin_can_manage_any_listing(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let seller = server.register("seller@example.com", Role::Seller).await?;
    let admin = server.create_admin("admin@example.com").await?;
    let id = server
        .create_property(&seller, "Shop", "Quetta", 2_000_000.0, &[])
        .await?;

    let response = server
        .client()
        .delete(format!("{}/api/v1/properties/{}", server.url(), id))
        .header("Authorization", admin.bearer())
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_primary_image_promotes_next(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let seller = server.register("seller@example.com", Role::Seller).await?;
    let id = server
        .create_property(
            &seller,
            "House",
            "Peshawar",
            6_000_000.0,
            &["https://img/1.jpg", "https://img/2.jpg"],
        )
        .await?;
    let url = format!("{}/api/v1/properties/{}", server.url(), id);

    let detail: serde_json::Value = server.client().get(&url).send().await?.json().await?;
    let primary_id = detail["images"][0]["id"].as_i64().unwrap_or_default();

    let response = server
        .client()
        .delete(format!("{}/images/{}", url, primary_id))
        .header("Authorization", seller.bearer())
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let detail: serde_json::Value = server.client().get(&url).send().await?.json().await?;
    assert_eq!(detail["images"].as_array().map(Vec::len), Some(1));
    assert_eq!(detail["images"][0]["image_url"], "https://img/2.jpg");
    assert_eq!(detail["images"][0]["is_primary"], true);

    let again = server
        .client()
        .delete(format!("{}/images/{}", url, primary_id))
        .header("Authorization", seller.bearer())
        .send()
        .await?;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_non_numeric_ids_use_error_envelope(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let seller = server.register("seller@example.com", Role::Seller).await?;

    let public = server
        .client()
        .get(format!("{}/api/v1/properties/abc", server.url()))
        .send()
        .await?;
    assert_eq!(public.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = public.json().await?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let image = server
        .client()
        .delete(format!("{}/api/v1/properties/1/images/first", server.url()))
        .header("Authorization", seller.bearer())
        .send()
        .await?;
    assert_eq!(image.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = image.json().await?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let favorite = server
        .client()
        .get(format!("{}/api/v1/favorites/abc", server.url()))
        .header("Authorization", seller.bearer())
        .send()
        .await?;
    assert_eq!(favorite.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = favorite.json().await?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    Ok(())
}
