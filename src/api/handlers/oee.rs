//! OEE report endpoints
//!
//! Records are fetched for the requested window, then the engine runs on a
//! blocking worker so large windows never stall the request threads.

use axum::extract::{Query, State};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::ApiState;
use crate::api::envelope::ApiResponse;
use crate::api::error::ApiError;
use crate::api::query::OeeQuery;
use crate::storage::DeviceKey;
use crate::types::{Interval, RecordSet, TimeWindow};

// ============================================================================
// Response wrapper
// ============================================================================

/// The window a report covers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodEcho {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<Interval>,
}

/// Engine report tagged with the device and window it was computed for.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceReport<T: Serialize> {
    pub factory_id: String,
    pub device_id: String,
    pub period: PeriodEcho,
    #[serde(flatten)]
    pub report: T,
}

impl<T: Serialize> DeviceReport<T> {
    fn new(device: DeviceKey, window: &TimeWindow, interval: Option<Interval>, report: T) -> Self {
        Self {
            factory_id: device.factory_id,
            device_id: device.device_id,
            period: PeriodEcho {
                start: window.start(),
                end: window.end(),
                total_hours: window.total_hours(),
                interval,
            },
            report,
        }
    }
}

async fn load(state: &ApiState, query: &OeeQuery) -> Result<(DeviceKey, TimeWindow, RecordSet), ApiError> {
    let (device, window) = resolve(state, query)?;
    let records = fetch(state, &device, &window).await?;
    Ok((device, window, records))
}

fn resolve(state: &ApiState, query: &OeeQuery) -> Result<(DeviceKey, TimeWindow), ApiError> {
    Ok((query.device()?, query.window(state.default_start, Utc::now())?))
}

async fn fetch(state: &ApiState, device: &DeviceKey, window: &TimeWindow) -> Result<RecordSet, ApiError> {
    let records = state.store.record_set(device, window).await?;
    debug!(
        factory_id = %device.factory_id,
        device_id = %device.device_id,
        status = records.status.len(),
        production = records.production.len(),
        quality = records.quality.len(),
        "Loaded records"
    );
    Ok(records)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/oee/summary - Buckets and ratios for the window
pub async fn get_summary(
    State(state): State<ApiState>,
    Query(query): Query<OeeQuery>,
) -> Result<Response, ApiError> {
    let (device, window, records) = load(&state, &query).await?;
    let analyzer = state.analyzer;
    let summary = tokio::task::spawn_blocking(move || analyzer.summary(&records, &window)).await?;
    Ok(ApiResponse::ok(DeviceReport::new(device, &window, None, summary)))
}

/// GET /api/v1/oee/waterfall - Loss bridge from total to value operating time
pub async fn get_waterfall(
    State(state): State<ApiState>,
    Query(query): Query<OeeQuery>,
) -> Result<Response, ApiError> {
    let (device, window, records) = load(&state, &query).await?;
    let analyzer = state.analyzer;
    let report = tokio::task::spawn_blocking(move || analyzer.waterfall(&records, &window)).await?;
    Ok(ApiResponse::ok(DeviceReport::new(device, &window, None, report)))
}

/// GET /api/v1/oee/timeline - Ratios per hourly, daily or weekly period
pub async fn get_timeline(
    State(state): State<ApiState>,
    Query(query): Query<OeeQuery>,
) -> Result<Response, ApiError> {
    let interval = query.interval(state.default_interval)?;
    let (device, window) = resolve(&state, &query)?;
    let analyzer = state.analyzer;
    // Oversized windows are refused before the store is touched.
    analyzer.check_timeline_size(&window, interval)?;
    let records = fetch(&state, &device, &window).await?;
    let report =
        tokio::task::spawn_blocking(move || analyzer.timeline(&records, &window, interval)).await??;
    Ok(ApiResponse::ok(DeviceReport::new(
        device,
        &window,
        Some(interval),
        report,
    )))
}

/// GET /api/v1/oee/stops - Stop events by category and per-reason totals
pub async fn get_stops(
    State(state): State<ApiState>,
    Query(query): Query<OeeQuery>,
) -> Result<Response, ApiError> {
    let (device, window, records) = load(&state, &query).await?;
    let analyzer = state.analyzer;
    let report = tokio::task::spawn_blocking(move || analyzer.stop_causes(&records)).await?;
    Ok(ApiResponse::ok(DeviceReport::new(device, &window, None, report)))
}
