//! API Routes
//!
//! Configures the Axum router with all cache admin endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    get_data_handler, health_handler, invalidate_handler, listeners_handler, metrics_handler,
    put_data_handler, reset_metrics_handler, stats_handler, sweep_handler, validity_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Storage overview and metrics snapshot
/// - `GET /metrics` - Stats plus summary, also logged
/// - `POST /metrics/reset` - Clear counters and latency samples
/// - `GET /cache/:data_type/valid` - Validity and TTL of one entry
/// - `DELETE /cache/:data_type` - Invalidate one type, or `all`
/// - `POST /sweep` - Delete expired entries now
/// - `GET /data/:data_type` - Remote-first read through the cache
/// - `PUT /data/:data_type` - Write the remote document
/// - `GET /listeners` - Live invalidation listener states
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/metrics", get(metrics_handler))
        .route("/metrics/reset", post(reset_metrics_handler))
        .route("/cache/:data_type/valid", get(validity_handler))
        .route("/cache/:data_type", delete(invalidate_handler))
        .route("/sweep", post(sweep_handler))
        .route("/data/:data_type", get(get_data_handler).put(put_data_handler))
        .route("/listeners", get(listeners_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
