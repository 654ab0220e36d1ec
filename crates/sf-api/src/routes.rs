//! Router composition.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::artifact::{get_artifact, get_thumbnail};
use crate::handlers::catalog::{
    get_platform_handler, get_voice_handler, list_avatars, list_platforms, list_stock_media, list_voices,
};
use crate::handlers::health::{health, ready};
use crate::handlers::jobs::{cancel_job, get_job_status, list_jobs, statistics, submit_job};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;
use crate::ws::ws_job_events;

pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let job_routes = Router::new()
        .route("/jobs", post(submit_job).get(list_jobs))
        .route("/jobs/:job_id", get(get_job_status))
        .route("/jobs/:job_id/cancel", post(cancel_job))
        .route("/jobs/:job_id/artifact", get(get_artifact))
        .route("/jobs/:job_id/thumbnail", get(get_thumbnail))
        .route("/statistics", get(statistics));

    let catalog_routes = Router::new()
        .route("/catalog/platforms", get(list_platforms))
        .route("/catalog/platforms/:id", get(get_platform_handler))
        .route("/catalog/voices", get(list_voices))
        .route("/catalog/voices/:id", get(get_voice_handler))
        .route("/catalog/avatars", get(list_avatars))
        .route("/catalog/stock-media", get(list_stock_media));

    let api_routes = Router::new().merge(job_routes).merge(catalog_routes);

    let ws_routes = Router::new().route("/ws/jobs/:job_id", get(ws_job_events));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = match metrics_handle {
        Some(handle) => Router::new().route("/metrics", get(move || async move { handle.render() })),
        None => Router::new(),
    };

    let max_body_bytes = state.config.max_body_bytes;
    let cors_origins = state.config.cors_origins.clone();

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&cors_origins))
        .with_state(state)
}
