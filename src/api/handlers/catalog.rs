//! Factory and device catalog endpoints

use axum::extract::{Query, State};
use axum::response::Response;

use super::ApiState;
use crate::api::envelope::ApiResponse;
use crate::api::error::ApiError;
use crate::api::query::{require, DeviceQuery};

/// GET /api/v1/factories
pub async fn get_factories(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let factories = state.store.factories().await?;
    Ok(ApiResponse::ok(factories))
}

/// GET /api/v1/devices?factoryId=
pub async fn get_devices(
    State(state): State<ApiState>,
    Query(query): Query<DeviceQuery>,
) -> Result<Response, ApiError> {
    let factory_id = require(query.factory_id.as_ref(), "factoryId")?;
    let devices = state.store.devices(factory_id).await?;
    Ok(ApiResponse::ok(devices))
}
