// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Json,
};

use super::ApiJson;
use tracing::info;

use crate::{
    devices::{DeviceClass, DeviceSnapshot},
    error::ApiError,
    models::DeviceStatusUpdate,
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/device/status",
    tag = "Devices",
    security(("bearer" = [])),
    responses((status = 200, body = DeviceSnapshot))
)]
pub async fn device_status(State(state): State<AppState>) -> Json<DeviceSnapshot> {
    Json(state.devices.snapshot().await)
}

#[utoipa::path(
    post,
    path = "/api/device/status/{class}",
    params(
        ("class" = String, Path, description = "door, reader, pinpad or buzzer")
    ),
    request_body = DeviceStatusUpdate,
    tag = "Devices",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Snapshot after the write", body = DeviceSnapshot),
        (status = 400, description = "Missing device_id or status, or status outside the class vocabulary"),
        (status = 404, description = "Unknown device class")
    )
)]
pub async fn update_device_status(
    State(state): State<AppState>,
    Path(class): Path<String>,
    ApiJson(request): ApiJson<DeviceStatusUpdate>,
) -> Result<Json<DeviceSnapshot>, ApiError> {
    let class = DeviceClass::parse(&class)?;

    let device_id = request
        .device_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::missing_field("device_id"))?;

    let status = request
        .status
        .filter(|status| !status.is_null())
        .ok_or_else(|| ApiError::missing_field("status"))?;

    let snapshot = state.devices.set_status(class, &status).await?;
    info!(class = %class, device_id = %device_id, status = %status, "device status updated");

    Ok(Json(snapshot))
}
