//! HTTP routes for the Apni Zameen API.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::crypto::TokenCodec;
use crate::handlers::{self, auth_handler, favorites, inquiries, properties, users};
use crate::middleware::{http_metrics_middleware, require_auth, AuthState};
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Request timeout applied to every route.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,

    /// Token issuer and verifier, keyed from `config.jwt_secret`.
    pub codec: TokenCodec,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let codec = TokenCodec::new(&config.jwt_secret, config.jwt_clock_skew_seconds);
        Self {
            pool,
            config,
            codec,
        }
    }
}

/// Build the application routes.
///
/// Public:
/// - `/health`, `/ready`, `/metrics` (unversioned operational endpoints)
/// - `POST /api/v1/auth/register`, `POST /api/v1/auth/login`
/// - `GET /api/v1/properties`, `GET /api/v1/properties/:id`
///
/// Everything else requires a bearer token. Layers, innermost first:
/// CORS, tracing, 30 second timeout, HTTP metrics.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        codec: state.codec.clone(),
    });
    let auth = middleware::from_fn_with_state(auth_state, require_auth);

    // Paths that mix public and protected methods
    let listing_routes = Router::new()
        .route(
            "/api/v1/properties",
            get(properties::search_properties)
                .merge(post(properties::create_property).route_layer(auth.clone())),
        )
        .route(
            "/api/v1/properties/:id",
            get(properties::get_property).merge(
                put(properties::update_property)
                    .delete(properties::delete_property)
                    .route_layer(auth.clone()),
            ),
        );

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/api/v1/auth/register", post(auth_handler::register))
        .route("/api/v1/auth/login", post(auth_handler::login));

    let protected_routes = Router::new()
        .route("/api/v1/me", get(auth_handler::me))
        .route("/api/v1/me/properties", get(properties::my_properties))
        .route("/api/v1/me/inquiries", get(inquiries::my_inquiries))
        .route(
            "/api/v1/properties/:id/images/:image_id",
            delete(properties::delete_property_image),
        )
        .route(
            "/api/v1/inquiries",
            get(inquiries::list_inquiries).post(inquiries::create_inquiry),
        )
        .route(
            "/api/v1/inquiries/:id",
            get(inquiries::get_inquiry).put(inquiries::update_inquiry),
        )
        .route(
            "/api/v1/favorites",
            get(favorites::list_favorites).post(favorites::add_favorite),
        )
        .route(
            "/api/v1/favorites/:property_id",
            get(favorites::check_favorite).delete(favorites::remove_favorite),
        )
        .route("/api/v1/users", get(users::list_users))
        .route(
            "/api/v1/users/:id",
            get(users::get_user)
                .put(users::update_user_role)
                .delete(users::delete_user),
        )
        .route_layer(auth);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    public_routes
        .merge(listing_routes)
        .merge(protected_routes)
        .with_state(state)
        .merge(metrics_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        // Outermost, so framework rejections (404, 405, 415) are counted
        .layer(middleware::from_fn(http_metrics_middleware))
}
