//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` over a
//! temporary sled store and exercise the /api/v1/* endpoints using
//! `tower::ServiceExt::oneshot()`. No binary spawn, no network port.

use oee_analytics::api::{create_app, ApiState};
use oee_analytics::config::EngineConfig;
use oee_analytics::storage::{
    DeviceInfo, DeviceKey, FactoryInfo, RecordSource, RecordStore, StorageError, StoreCounts,
};
use oee_analytics::types::{
    MachineStatus, ProductionRecord, QualityRecord, StatusRecord, TimeWindow,
};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use tower::ServiceExt;

fn at(hours: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
}

/// One 10-hour shift on F1/press-7:
/// running 0-4, idle 4-5, error 5-6, maintenance 6-8, stopped 8-10.
fn seeded_store() -> RecordStore {
    let store = RecordStore::open_temporary().unwrap();
    let device = DeviceKey::new("F1", "press-7");
    store.register_factory("F1", Some("Plant North")).unwrap();
    store.register_factory("F2", None).unwrap();
    store.register_device(&device, Some("press")).unwrap();

    let shift = [
        (0, MachineStatus::Running),
        (4, MachineStatus::Idle),
        (5, MachineStatus::Error),
        (6, MachineStatus::Maintenance),
        (8, MachineStatus::Stopped),
        (10, MachineStatus::Stopped),
    ];
    for (hour, status) in shift {
        store
            .insert_status(&device, &StatusRecord { timestamp: at(hour), status })
            .unwrap();
    }
    for (hour, efficiency) in [(1, 80.0), (3, 100.0)] {
        store
            .insert_production(
                &device,
                &ProductionRecord { timestamp: at(hour), interval_count: 10.0, efficiency },
            )
            .unwrap();
    }
    for (hour, defect_rate) in [(2, 0.1), (4, 0.3)] {
        store
            .insert_quality(&device, &QualityRecord { timestamp: at(hour), defect_rate })
            .unwrap();
    }
    store
}

fn create_test_state() -> ApiState {
    ApiState::new(Arc::new(seeded_store()), &EngineConfig::default())
}

/// A record source whose every read fails.
struct OfflineStore;

fn offline() -> StorageError {
    StorageError::Import {
        line: 0,
        message: "store offline".to_string(),
    }
}

#[async_trait::async_trait]
impl RecordSource for OfflineStore {
    async fn factories(&self) -> Result<Vec<FactoryInfo>, StorageError> {
        Err(offline())
    }

    async fn devices(&self, _factory_id: &str) -> Result<Vec<DeviceInfo>, StorageError> {
        Err(offline())
    }

    async fn status_records(
        &self,
        _device: &DeviceKey,
        _window: &TimeWindow,
    ) -> Result<Vec<StatusRecord>, StorageError> {
        Err(offline())
    }

    async fn production_records(
        &self,
        _device: &DeviceKey,
        _window: &TimeWindow,
    ) -> Result<Vec<ProductionRecord>, StorageError> {
        Err(offline())
    }

    async fn quality_records(
        &self,
        _device: &DeviceKey,
        _window: &TimeWindow,
    ) -> Result<Vec<QualityRecord>, StorageError> {
        Err(offline())
    }

    async fn counts(&self) -> Result<StoreCounts, StorageError> {
        Err(offline())
    }
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    get_with(create_test_state(), uri).await
}

async fn get_with(state: ApiState, uri: &str) -> (StatusCode, serde_json::Value) {
    let app = create_app(state);
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

const SHIFT: &str = "factoryId=F1&deviceId=press-7&startDate=2024-05-01T00:00:00Z&endDate=2024-05-01T10:00:00Z";

fn close(value: &serde_json::Value, expected: f64) -> bool {
    value.as_f64().is_some_and(|v| (v - expected).abs() < 1e-9)
}

// ============================================================================
// Input validation
// ============================================================================

#[tokio::test]
async fn missing_device_id_is_bad_request() {
    for endpoint in ["summary", "waterfall", "timeline", "stops"] {
        let (status, body) = get(&format!("/api/v1/oee/{endpoint}?factoryId=F1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{endpoint}");
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert!(body["error"]["message"].as_str().unwrap().contains("deviceId"));
    }
}

#[tokio::test]
async fn inverted_window_is_bad_request() {
    let (status, body) = get(
        "/api/v1/oee/summary?factoryId=F1&deviceId=press-7&startDate=2024-05-02&endDate=2024-05-01",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["meta"]["timestamp"].is_string());
}

#[tokio::test]
async fn unparsable_date_is_bad_request() {
    let (status, body) =
        get("/api/v1/oee/summary?factoryId=F1&deviceId=press-7&startDate=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("startDate"));
}

#[tokio::test]
async fn unknown_interval_is_bad_request() {
    let (status, _) = get(&format!("/api/v1/oee/timeline?{SHIFT}&interval=monthly")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_timeline_is_bad_request() {
    let (status, body) = get(
        "/api/v1/oee/timeline?factoryId=F1&deviceId=press-7&startDate=2020-01-01&endDate=2024-01-01&interval=hourly",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("periods"));
}

#[tokio::test]
async fn oversized_timeline_is_refused_before_reading_the_store() {
    let state = ApiState::new(Arc::new(OfflineStore), &EngineConfig::default());
    let (status, body) = get_with(
        state,
        "/api/v1/oee/timeline?factoryId=F1&deviceId=press-7&startDate=2020-01-01&endDate=2024-01-01&interval=hourly",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn store_failure_is_upstream_error() {
    let state = ApiState::new(Arc::new(OfflineStore), &EngineConfig::default());
    let (status, body) = get_with(state, &format!("/api/v1/oee/timeline?{SHIFT}")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn offline_store_degrades_health() {
    let state = ApiState::new(Arc::new(OfflineStore), &EngineConfig::default());
    let (status, body) = get_with(state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert!(body["records"].is_null());
}

// ============================================================================
// Reports
// ============================================================================

#[tokio::test]
async fn summary_matches_hand_computed_buckets() {
    let (status, body) = get(&format!("/api/v1/oee/summary?{SHIFT}")).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["factoryId"], "F1");
    assert_eq!(data["deviceId"], "press-7");
    assert!(close(&data["period"]["totalHours"], 10.0));
    assert_eq!(data["dataStatus"], "available");

    let metrics = &data["metrics"];
    assert!(close(&metrics["buckets"]["operatingTime"], 6.0));
    assert!(close(&metrics["buckets"]["productionTime"], 6.0));
    assert!(close(&metrics["buckets"]["mannedTime"], 8.0));
    // 4h running x 90% efficiency x (1 - 0.2 defects)
    assert!(close(&metrics["buckets"]["valueOperatingTime"], 2.88));
    assert!(close(&metrics["oee1"], 48.0));
    assert!(close(&metrics["tcu"], 28.8));
}

#[tokio::test]
async fn device_without_status_is_unavailable_not_error() {
    let (status, body) = get(
        "/api/v1/oee/waterfall?factoryId=F1&deviceId=ghost&startDate=2024-05-01&endDate=2024-05-02",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dataStatus"], "unavailable");
    assert!(body["data"]["metrics"].is_null());
    assert_eq!(body["data"]["waterfallData"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn waterfall_ends_on_value_operating_time() {
    let (status, body) = get(&format!("/api/v1/oee/waterfall?{SHIFT}")).await;
    assert_eq!(status, StatusCode::OK);
    let steps = body["data"]["waterfallData"].as_array().unwrap();
    assert_eq!(steps.len(), 9);
    assert_eq!(steps[0]["key"], "total");
    assert!(close(&steps[8]["cumulative"], 2.88));
}

#[tokio::test]
async fn hourly_timeline_has_one_point_per_hour() {
    let (status, body) = get(&format!("/api/v1/oee/timeline?{SHIFT}&interval=hourly")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["period"]["interval"], "hourly");
    let points = body["data"]["timeline"].as_array().unwrap();
    assert_eq!(points.len(), 10);
    assert_eq!(points[0]["timestamp"], "2024-05-01T00:00:00Z");
}

#[tokio::test]
async fn stops_are_grouped_by_category() {
    let (status, body) = get(&format!("/api/v1/oee/stops?{SHIFT}")).await;
    assert_eq!(status, StatusCode::OK);
    let grouped = &body["data"]["stopsByCategory"];
    assert_eq!(grouped["lossDuringOperation"].as_array().unwrap().len(), 2);
    assert_eq!(grouped["batchSpecific"].as_array().unwrap().len(), 1);
    assert_eq!(grouped["nonProduction"].as_array().unwrap().len(), 1);
    assert!(close(&body["data"]["totalStopHours"], 6.0));

    let causes = body["data"]["causes"].as_array().unwrap();
    // 2h ties between downtime and maintenance break alphabetically.
    assert_eq!(causes[0]["reason"], "Planned Downtime");
    assert_eq!(causes[0]["categoryLabel"], "Non-Production Activities");
    assert_eq!(causes[1]["categoryLabel"], "Batch Specific Non-Operation");
}

// ============================================================================
// Catalog and health
// ============================================================================

#[tokio::test]
async fn factories_fall_back_to_generated_names() {
    let (status, body) = get("/api/v1/factories").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["name"].as_str())
        .collect();
    assert_eq!(names, ["Plant North", "Factory F2"]);
}

#[tokio::test]
async fn devices_require_factory_id() {
    let (status, _) = get("/api/v1/devices").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get("/api/v1/devices?factoryId=F1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], "press-7");
    assert_eq!(body["data"][0]["deviceType"], "press");
}

#[tokio::test]
async fn legacy_health_reports_record_counts() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["records"]["status"], 6);
    assert_eq!(body["records"]["production"], 2);
}
