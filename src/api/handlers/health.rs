//! Liveness endpoint

use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use super::ApiState;
use crate::api::envelope::ApiResponse;
use crate::storage::StoreCounts;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the record store cannot be read
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub records: Option<StoreCounts>,
}

async fn health(state: &ApiState) -> HealthResponse {
    let records = match state.store.counts().await {
        Ok(counts) => Some(counts),
        Err(e) => {
            warn!(error = %e, "Health check could not read record counts");
            None
        }
    };
    HealthResponse {
        status: if records.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_secs(),
        records,
    }
}

/// GET /health - Bare liveness document for probes
pub async fn legacy_health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(health(&state).await)
}

/// GET /api/v1/health
pub async fn get_health(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(health(&state).await)
}
