//! payfix-api library - HTTP service for the payments exception desk
//!
//! Exposes the exception queue, the correct-and-resubmit workflow, the audit
//! trail, and dashboard statistics over JSON routes under `/api`.

use axum::Router;
use payfix_common::config::{ServiceConfig, DEFAULT_DASHBOARD_DAYS, DEFAULT_TOKEN_TTL_SECONDS};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Bearer token signing secret
    pub token_secret: String,
    /// Data routes reject requests without a valid bearer token
    pub require_auth: bool,
    pub token_ttl_seconds: i64,
    /// Window used by /api/dashboard when `days` is absent
    pub dashboard_default_days: i64,
}

impl AppState {
    /// Create state with default settings (authentication required)
    pub fn new(db: SqlitePool, token_secret: String) -> Self {
        Self {
            db,
            token_secret,
            require_auth: true,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            dashboard_default_days: DEFAULT_DASHBOARD_DAYS,
        }
    }

    /// Create state from loaded service configuration
    pub fn from_config(db: SqlitePool, token_secret: String, config: &ServiceConfig) -> Self {
        Self {
            db,
            token_secret,
            require_auth: config.require_auth,
            token_ttl_seconds: config.token_ttl_seconds,
            dashboard_default_days: config.dashboard_default_days,
        }
    }
}

/// Build application router
///
/// Health, ping, signup, and login are public; every data route passes
/// through the bearer token middleware.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Protected routes (bearer token when require_auth is set)
    let protected = Router::new()
        .route("/api/exceptions", get(api::list_exceptions))
        .route("/api/processed", get(api::list_processed))
        .route("/api/fix", post(api::fix_transaction))
        .route("/api/seed", post(api::seed_data))
        .route("/api/dashboard", get(api::dashboard))
        .route("/api/operator_stats", get(api::operator_stats))
        .route("/api/audit", get(api::audit_log))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes
    let public = Router::new()
        .route("/api/ping", get(api::ping))
        .route("/api/signup", post(api::signup))
        .route("/api/login", post(api::login))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
