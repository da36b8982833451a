use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── Byte channel ────────────────────────────────────────
        .route("/api/response", post(handlers::channel::write_response))
        .route("/api/report", get(handlers::channel::read_report))
        .route("/api/samples", get(handlers::channel::get_samples))
        // ── Stimulus control ────────────────────────────────────
        .route(
            "/api/stimulus/start",
            post(handlers::stimulus::start_stimulus),
        )
        .route(
            "/api/stimulus/stop",
            post(handlers::stimulus::stop_stimulus),
        )
        .route(
            "/api/stimulus/status",
            get(handlers::stimulus::stimulus_status),
        )
        // ── Simulated responders ────────────────────────────────
        .route(
            "/api/responders/start",
            post(handlers::responders::start_responders),
        )
        .route(
            "/api/responders/stop",
            post(handlers::responders::stop_responders),
        )
        // ── Metrics ─────────────────────────────────────────────
        .route("/api/metrics", get(handlers::metrics::get_metrics))
        .route("/api/metrics/stream", get(handlers::metrics::metrics_stream))
        .route("/api/reset", post(handlers::metrics::reset))
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn(timing::timing_middleware))
        .layer(CorsLayer::permissive())
}
