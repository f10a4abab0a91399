//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Json, Router,
};
use mediagraph_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router<()> {
    let cors = setup_cors();
    crate::error::set_production_mode(config.is_production());

    Router::new()
        .route(
            "/",
            post(handlers::media_upload::upload_media).head(handlers::health::liveness),
        )
        .route("/health", get(handlers::health::liveness))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route(
            "/{id}",
            get(handlers::media_get::get_media).delete(handlers::media_delete::delete_media),
        )
        // The tower-http limit below replaces axum's 2 MB default.
        .layer(DefaultBodyLimit::disable())
        .layer(ConcurrencyLimitLayer::new(config.base.http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(
            config.base.max_file_size_bytes + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn setup_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}
