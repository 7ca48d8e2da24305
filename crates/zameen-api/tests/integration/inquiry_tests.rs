//! Integration tests for inquiries between buyers and listing owners.

use common::types::Role;
use reqwest::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use zameen_test_utils::{TestApiServer, TestUser};

async fn send_inquiry(
    server: &TestApiServer,
    from: &TestUser,
    property_id: i64,
    message: &str,
) -> Result<i64, anyhow::Error> {
    let response = server
        .client()
        .post(format!("{}/api/v1/inquiries", server.url()))
        .header("Authorization", from.bearer())
        .json(&json!({"property_id": property_id, "message": message}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"], "Inquiry sent successfully");
    body["inquiry_id"]
        .as_i64()
        .ok_or_else(|| anyhow::anyhow!("response has no inquiry_id"))
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_inquiry_flow_between_buyer_and_owner(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let seller = server.register("seller@example.com", Role::Seller).await?;
    let buyer = server.register("buyer@example.com", Role::Buyer).await?;
    let property_id = server
        .create_property(&seller, "Farmhouse", "Lahore", 50_000_000.0, &[])
        .await?;

    let inquiry_id = send_inquiry(&server, &buyer, property_id, "Is it still available?").await?;
    let url = format!("{}/api/v1/inquiries/{}", server.url(), inquiry_id);

    let as_owner: serde_json::Value = server
        .client()
        .get(&url)
        .header("Authorization", seller.bearer())
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(as_owner["status"], "pending");
    assert_eq!(as_owner["property_title"], "Farmhouse");
    assert_eq!(as_owner["user_email"], "buyer@example.com");

    let responded = server
        .client()
        .put(&url)
        .header("Authorization", seller.bearer())
        .json(&json!({"status": "responded"}))
        .send()
        .await?;
    assert_eq!(responded.status(), StatusCode::OK);
    let body: serde_json::Value = responded.json().await?;
    assert_eq!(body["status"], "responded");

    let received: serde_json::Value = server
        .client()
        .get(format!("{}/api/v1/me/inquiries", server.url()))
        .header("Authorization", seller.bearer())
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(received.as_array().map(Vec::len), Some(1));

    let sent: serde_json::Value = server
        .client()
        .get(format!("{}/api/v1/inquiries", server.url()))
        .header("Authorization", buyer.bearer())
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(sent.as_array().map(Vec::len), Some(1));
    assert_eq!(sent[0]["status"], "responded");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_inquiry_hidden_from_strangers(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let seller = server.register("seller@example.com", Role::Seller).await?;
    let buyer = server.register("buyer@example.com", Role::Buyer).await?;
    let stranger = server.register("stranger@example.com", Role::Buyer).await?;
    let admin = server.create_admin("admin@example.com").await?;
    let property_id = server
        .create_property(&seller, "Flat", "Karachi", 8_000_000.0, &[])
        .await?;
    let inquiry_id = send_inquiry(&server, &buyer, property_id, "Price negotiable?").await?;
    let url = format!("{}/api/v1/inquiries/{}", server.url(), inquiry_id);

    let forbidden = server
        .client()
        .get(&url)
        .header("Authorization", stranger.bearer())
        .send()
        .await?;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let closed_by_stranger = server
        .client()
        .put(&url)
        .header("Authorization", stranger.bearer())
        .json(&json!({"status": "closed"}))
        .send()
        .await?;
    assert_eq!(closed_by_stranger.status(), StatusCode::FORBIDDEN);

    let as_admin = server
        .client()
        .get(&url)
        .header("Authorization", admin.bearer())
        .send()
        .await?;
    assert_eq!(as_admin.status(), StatusCode::OK);

    let all: serde_json::Value = server
        .client()
        .get(format!("{}/api/v1/inquiries", server.url()))
        .header("Authorization", admin.bearer())
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(all.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_inquiry_validation(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let seller = server.register("seller@example.com", Role::Seller).await?;
    let buyer = server.register("buyer@example.com", Role::Buyer).await?;
    let property_id = server
        .create_property(&seller, "Flat", "Karachi", 8_000_000.0, &[])
        .await?;
    let url = format!("{}/api/v1/inquiries", server.url());

    let blank = server
        .client()
        .post(&url)
        .header("Authorization", buyer.bearer())
        .json(&json!({"property_id": property_id, "message": "   "}))
        .send()
        .await?;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let unknown = server
        .client()
        .post(&url)
        .header("Authorization", buyer.bearer())
        .json(&json!({"property_id": property_id + 50, "message": "Hello"}))
        .send()
        .await?;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let inquiry_id = send_inquiry(&server, &buyer, property_id, "Hello").await?;
    let bad_status = server
        .client()
        .put(format!("{}/{}", url, inquiry_id))
        .header("Authorization", buyer.bearer())
        .json(&json!({"status": "archived"}))
        .send()
        .await?;
    assert_eq!(bad_status.status(), StatusCode::BAD_REQUEST);

    let anonymous = server.client().post(&url).json(&json!({})).send().await?;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
