//! Render Job Service
//!
//! HTTP admission service for asynchronous document rendering. Callers
//! authenticate with a project API key and submit a template id plus data;
//! the service checks the key, resolves the template version inside the
//! key's organization and queues a durable render job that an external
//! worker picks up.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx, behind the [`store::RenderStore`] trait
//! - **Authentication**: `X-API-Key` with SHA-256 hashing
//! - **Format**: JSON requests/responses

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, state::AppState};

/// Build the HTTP application.
///
/// # Routes
///
/// - `GET /health` - public
/// - `GET|POST /v1/validate-key` - validates the key itself
/// - `POST /v1/generate-document` - API key required
/// - `GET /v1/render-jobs/{job_id}` - API key required
///
/// Every route answers unsupported methods with a JSON 405. The auth
/// middleware is a method route layer, so that 405 comes before the key is
/// checked.
/// CORS preflight requests are answered by the CORS layer before routing.
pub fn app(state: AppState, config: &Config) -> Router {
    let require_api_key =
        axum_middleware::from_fn_with_state(state.clone(), middleware::auth::auth_middleware);

    Router::new()
        .route(
            "/health",
            get(handlers::health::health_check).fallback(handlers::health::method_not_allowed),
        )
        .route(
            "/v1/validate-key",
            get(handlers::keys::validate_key)
                .post(handlers::keys::validate_key)
                .fallback(handlers::keys::method_not_allowed),
        )
        .route(
            "/v1/generate-document",
            post(handlers::documents::generate_document)
                .route_layer(require_api_key.clone())
                .fallback(handlers::documents::method_not_allowed),
        )
        .route(
            "/v1/render-jobs/{job_id}",
            get(handlers::jobs::get_render_job)
                .route_layer(require_api_key)
                .fallback(handlers::jobs::method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for browser callers.
///
/// Allows the configured origin, or any origin when none is configured.
fn cors_layer(config: &Config) -> CorsLayer {
    let allow_origin = match config.cors_allow_origin.as_deref() {
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(origin) => AllowOrigin::exact(origin),
            Err(_) => {
                tracing::warn!(origin, "ignoring invalid CORS_ALLOW_ORIGIN");
                AllowOrigin::any()
            }
        },
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(middleware::auth::API_KEY_HEADER),
        ])
}
