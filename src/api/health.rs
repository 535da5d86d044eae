// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use chrono::Utc;

use crate::models::{HealthResponse, ServiceInfo};
use crate::state::AppState;

pub const SERVICE_NAME: &str = "doorlock-gateway";

/// Liveness check with the broker connection state.
///
/// Always 200 while the process is serving; a disconnected broker is
/// reported in the body, not as a failure.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Service is running", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let mqtt = if state.dispatcher.is_connected() {
        "connected"
    } else {
        "disconnected"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        service: SERVICE_NAME.to_string(),
        mqtt: mqtt.to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, body = ServiceInfo))
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Doorlock gateway API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
