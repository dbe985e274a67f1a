//! API routes.

use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use crate::handlers::{fetch_transcript, health, method_not_allowed};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, handle_layer_error, panic_handler, request_id, request_logging, security_headers,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let transcript_routes = Router::new()
        .route(
            "/fetch-transcript/",
            post(fetch_transcript).fallback(method_not_allowed),
        )
        .route(
            "/fetch-transcript",
            post(fetch_transcript).fallback(method_not_allowed),
        );

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(transcript_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Route layer so the matched path is known when labelling
        .route_layer(middleware::from_fn(metrics_middleware))
        .layer(CatchPanicLayer::custom(panic_handler(
            state.config.is_production(),
        )))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_layer_error))
                .layer(TimeoutLayer::new(state.config.request_timeout)),
        )
        // Oversized bodies are rejected by the handler's body extractor
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
