//! Integration tests for bearer token handling on protected routes.
//!
//! Every rejection reason must look identical to the caller.

use common::types::Role;
use jsonwebtoken::Algorithm;
use reqwest::StatusCode;
use sqlx::PgPool;
use zameen_test_utils::{test_jwt_secret, TestApiServer, TestTokenBuilder, TEST_SECRET_SEED};

const GENERIC_MESSAGE: &str = "The access token is invalid or expired";

async fn me_status(
    server: &TestApiServer,
    header: &str,
    value: &str,
) -> Result<(StatusCode, serde_json::Value), anyhow::Error> {
    let response = server
        .client()
        .get(format!("{}/api/v1/me", server.url()))
        .header(header, value)
        .send()
        .await?;
    let status = response.status();
    let body = response.json().await?;
    Ok((status, body))
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_hand_built_token_is_accepted(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let user = server.register("built@example.com", Role::Buyer).await?;

    let token = TestTokenBuilder::new(user.id, "buyer").sign(&test_jwt_secret(TEST_SECRET_SEED));
    let (status, _) = me_status(&server, "Authorization", &format!("Bearer {token}")).await?;

    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_rejected_tokens_share_one_message(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let user = server.register("reject@example.com", Role::Buyer).await?;
    let secret = test_jwt_secret(TEST_SECRET_SEED);
    let future = chrono::Utc::now().timestamp() + 3_600;

    let tokens = [
        ("expired", TestTokenBuilder::new(user.id, "buyer").expired().sign(&secret)),
        (
            "foreign secret",
            TestTokenBuilder::new(user.id, "buyer").sign(&test_jwt_secret(TEST_SECRET_SEED + 1)),
        ),
        (
            "wrong algorithm",
            TestTokenBuilder::new(user.id, "buyer")
                .with_algorithm(Algorithm::HS512)
                .sign(&secret),
        ),
        (
            "future iat",
            TestTokenBuilder::new(user.id, "buyer").issued_at(future).sign(&secret),
        ),
        ("unknown role", TestTokenBuilder::new(user.id, "landlord").sign(&secret)),
        ("garbage", "not-a-jwt".to_string()),
    ];

    for (label, token) in tokens {
        let (status, body) = me_status(&server, "Authorization", &format!("Bearer {token}")).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{label} should be rejected");
        assert_eq!(body["error"]["message"], GENERIC_MESSAGE, "{label} message");
    }
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_alternate_header_sources(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    let user = server.register("proxy@example.com", Role::Buyer).await?;

    for header in ["http_authorization", "x-forwarded-authorization"] {
        let (status, _) = me_status(&server, header, &user.bearer()).await?;
        assert_eq!(status, StatusCode::OK, "{header} should be honoured");
    }
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_non_bearer_scheme_is_unauthenticated(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestApiServer::spawn(pool).await?;
    server.register("basic@example.com", Role::Buyer).await?;

    let (status, body) = me_status(&server, "Authorization", "Basic dXNlcjpwYXNz").await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    Ok(())
}
