//! Route configuration and setup

use crate::auth::admin_auth_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use khmedia_infra::admin_guard_middleware;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
const GUARD_CLEANUP_INTERVAL_SECS: u64 = 300;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let body_limit = state.config.media.max_upload_size_bytes + MULTIPART_OVERHEAD_BYTES;

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1_000)
        .max(1);

    let guard_for_cleanup = state.guard.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(tokio::time::Duration::from_secs(GUARD_CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            guard_for_cleanup.cleanup_expired().await;
        }
    });

    let app = public_routes()
        .merge(admin_routes(&state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        // Guard wraps authentication so it sees the 401s
        .layer(from_fn_with_state(state.guard.clone(), admin_guard_middleware))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(setup_cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    tracing::info!(
        admin_prefix = %state.admin_prefix(),
        body_limit_bytes = body_limit,
        http_concurrency_limit,
        "Routes configured"
    );

    Ok(app)
}

fn setup_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

/// Public read routes
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/media", get(handlers::media_get::list_media))
        .route("/media/{id}", get(handlers::media_get::get_media))
}

/// Admin routes under the configured admin prefix (bearer token required).
fn admin_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let prefix = state.admin_prefix();

    Router::new()
        .route(
            &format!("{}media", prefix),
            post(handlers::media_upload::create_media),
        )
        .route(
            &format!("{}media/{{id}}/image", prefix),
            put(handlers::media_upload::replace_media_image),
        )
        .route(
            &format!("{}media/{{id}}", prefix),
            delete(handlers::media_delete::delete_media),
        )
        .route_layer(from_fn_with_state(state.clone(), admin_auth_middleware))
}
