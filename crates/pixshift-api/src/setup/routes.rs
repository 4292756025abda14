//! Route configuration and setup

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::middleware::request_id_middleware;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use pixshift_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let http_concurrency_limit = config.http_concurrency_limit.max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        max_request_size_bytes = config.max_request_size_bytes,
        "HTTP limits enabled"
    );

    let app = Router::new()
        .merge(health_routes())
        .merge(conversion_routes())
        .route(
            &format!("{}/openapi.json", API_PREFIX),
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(
            utoipa_rapidoc::RapiDoc::new(format!("{}/openapi.json", API_PREFIX)).path("/docs"),
        )
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        // Multipart's own 2 MB default is replaced by the request-wide limit
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_request_size_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors.expose_headers([
        axum::http::header::CONTENT_DISPOSITION,
        axum::http::HeaderName::from_static(crate::constants::CONVERTED_COUNT_HEADER),
        axum::http::HeaderName::from_static(crate::constants::FAILED_COUNT_HEADER),
    ]))
}

fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/live", get(handlers::health::liveness_check))
}

fn conversion_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/convert", API_PREFIX),
            post(handlers::convert::convert_images),
        )
        .route(
            &format!("{}/preview", API_PREFIX),
            post(handlers::preview::preview_image),
        )
}
