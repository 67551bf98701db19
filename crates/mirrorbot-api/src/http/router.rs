//! Axum router configuration with middleware.

use axum::Router;
use axum::routing::{any, get};
use tower_http::trace::TraceLayer;

use crate::http::webhook;
use crate::state::AppState;

/// Build the router: the webhook at `/` plus a health check.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(webhook::webhook_entry))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
