//! API route definitions
//!
//! - /api/v1/factories - Factory catalog
//! - /api/v1/devices - Devices of one factory
//! - /api/v1/oee/* - Summary, waterfall, timeline and stop-cause reports
//! - /api/v1/health - Liveness inside the response envelope

use axum::{routing::get, Router};

use super::handlers::{self, ApiState};

/// Create all versioned API routes
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        // Catalog
        .route("/factories", get(handlers::get_factories))
        .route("/devices", get(handlers::get_devices))
        // OEE reports
        .route("/oee/summary", get(handlers::get_summary))
        .route("/oee/waterfall", get(handlers::get_waterfall))
        .route("/oee/timeline", get(handlers::get_timeline))
        .route("/oee/stops", get(handlers::get_stops))
        .with_state(state)
}

/// Legacy health endpoint at root level
pub fn legacy_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::legacy_health_check))
        .with_state(state)
}
