//! Test server harness for E2E testing.
//!
//! Provides `TestApiServer` for running the real router in tests.

use crate::crypto_fixtures::{test_jwt_secret, TEST_SECRET_SEED};
use common::secret::signing_key;
use common::types::Role;
use serde_json::json;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use zameen_api::config::{Config, DEFAULT_JWT_CLOCK_SKEW_SECONDS, MIN_BCRYPT_COST};
use zameen_api::crypto::{self, TokenCodec};
use zameen_api::observability::metrics::init_metrics_recorder;
use zameen_api::repositories::users;
use zameen_api::routes::{self, AppState};

/// Password every harness-created account uses.
pub const TEST_PASSWORD: &str = "correct horse battery";

/// An account created through the harness.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub token: String,
}

impl TestUser {
    /// `Authorization` header value for this user.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Test harness for spawning the API server in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[sqlx::test(migrations = "../../migrations")]
/// async fn test_health(pool: PgPool) -> Result<(), anyhow::Error> {
///     let server = TestApiServer::spawn(pool).await?;
///     let response = server.client().get(format!("{}/health", server.url())).send().await?;
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestApiServer {
    addr: SocketAddr,
    pool: PgPool,
    state: Arc<AppState>,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

impl TestApiServer {
    /// Spawn a server on 127.0.0.1 with an ephemeral port.
    ///
    /// Tokens are signed with `test_jwt_secret(TEST_SECRET_SEED)` and
    /// passwords hashed at the minimum bcrypt cost.
    pub async fn spawn(pool: PgPool) -> Result<Self, anyhow::Error> {
        let config = Config {
            database_url: String::new(), // Not used after connection established
            bind_address: "127.0.0.1:0".to_string(),
            jwt_secret: signing_key(test_jwt_secret(TEST_SECRET_SEED)),
            jwt_clock_skew_seconds: DEFAULT_JWT_CLOCK_SKEW_SECONDS,
            bcrypt_cost: MIN_BCRYPT_COST,
            db_max_connections: 5,
        };

        let state = Arc::new(AppState::new(pool.clone(), config));

        // The global recorder can only be installed once per process
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                PrometheusBuilder::new().build_recorder().handle()
            }
        };

        let app = routes::build_routes(state.clone(), metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            pool,
            state,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Base URL, e.g. `http://127.0.0.1:54321`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// The server's own token codec.
    pub fn codec(&self) -> &TokenCodec {
        &self.state.codec
    }

    /// Register a buyer or seller through `POST /api/v1/auth/register`.
    pub async fn register(&self, email: &str, role: Role) -> Result<TestUser, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/api/v1/auth/register", self.url()))
            .json(&json!({
                "name": "Test User",
                "email": email,
                "password": TEST_PASSWORD,
                "role": role.as_str(),
            }))
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::CREATED {
            anyhow::bail!(
                "registration of {} failed with {}: {}",
                email,
                response.status(),
                response.text().await?
            );
        }

        let body: serde_json::Value = response.json().await?;
        let id = body["user"]["id"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("registration response has no user id"))?;
        let token = body["token"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("registration response has no token"))?
            .to_string();

        Ok(TestUser {
            id,
            email: email.to_string(),
            role,
            token,
        })
    }

    /// Create an admin directly in the database (admins cannot
    /// self-register) and issue it a token.
    pub async fn create_admin(&self, email: &str) -> Result<TestUser, anyhow::Error> {
        let hash = crypto::hash_password(TEST_PASSWORD, MIN_BCRYPT_COST)?;
        let user = users::create_user(&self.pool, "Admin", email, &hash, None, Role::Admin).await?;
        let token = self.codec().issue(user.id, Role::Admin)?;

        Ok(TestUser {
            id: user.id,
            email: email.to_string(),
            role: Role::Admin,
            token,
        })
    }

    /// Create a listing owned by `owner` through the API and return its id.
    pub async fn create_property(
        &self,
        owner: &TestUser,
        title: &str,
        city: &str,
        price: f64,
        images: &[&str],
    ) -> Result<i64, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/api/v1/properties", self.url()))
            .header("Authorization", owner.bearer())
            .json(&json!({
                "title": title,
                "description": "Test listing",
                "price": price,
                "property_type": "house",
                "bedrooms": 3,
                "bathrooms": 2,
                "address": "1 Test Street",
                "city": city,
                "state": "Punjab",
                "zip_code": "54000",
                "images": images,
            }))
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::CREATED {
            anyhow::bail!(
                "property creation failed with {}: {}",
                response.status(),
                response.text().await?
            );
        }

        let body: serde_json::Value = response.json().await?;
        body["property_id"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("creation response has no property_id"))
    }
}

impl Drop for TestApiServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
