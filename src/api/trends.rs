// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use super::ApiJson;

use crate::{
    error::ApiError,
    models::{
        DoorOpenLogRequest, DoorOpenLogResponse, FrequentAccessQuery, FrequentAccessResponse,
        LongOpenDoorsQuery, LongOpenDoorsResponse,
    },
    state::AppState,
    storage::NewDoorOpenLog,
    trends::{DEFAULT_OPEN_THRESHOLD_SECS, DEFAULT_WINDOW_HOURS},
};

#[utoipa::path(
    get,
    path = "/api/trends/frequent-access",
    params(FrequentAccessQuery),
    tag = "Trends",
    security(("bearer" = [])),
    responses(
        (status = 200, body = FrequentAccessResponse),
        (status = 400, description = "hours must be positive")
    )
)]
pub async fn frequent_access(
    State(state): State<AppState>,
    Query(query): Query<FrequentAccessQuery>,
) -> Result<Json<FrequentAccessResponse>, ApiError> {
    let hours = query.hours.unwrap_or(DEFAULT_WINDOW_HOURS);
    if hours <= 0 {
        return Err(ApiError::bad_request("hours must be greater than 0").with_code("invalid_hours"));
    }

    Ok(Json(FrequentAccessResponse {
        time_period_hours: hours,
        frequent_access: state.trends.frequent_access(hours)?,
    }))
}

#[utoipa::path(
    get,
    path = "/api/trends/long-open-doors",
    params(LongOpenDoorsQuery),
    tag = "Trends",
    security(("bearer" = [])),
    responses(
        (status = 200, body = LongOpenDoorsResponse),
        (status = 400, description = "duration must not be negative")
    )
)]
pub async fn long_open_doors(
    State(state): State<AppState>,
    Query(query): Query<LongOpenDoorsQuery>,
) -> Result<Json<LongOpenDoorsResponse>, ApiError> {
    let threshold = query.duration.unwrap_or(DEFAULT_OPEN_THRESHOLD_SECS);
    if threshold < 0 {
        return Err(ApiError::bad_request("duration must not be negative").with_code("invalid_duration"));
    }

    Ok(Json(LongOpenDoorsResponse {
        duration_threshold_seconds: threshold,
        long_open_doors: state.trends.long_open_doors(threshold)?,
    }))
}

#[utoipa::path(
    post,
    path = "/api/trends/door-open-log",
    request_body = DoorOpenLogRequest,
    tag = "Trends",
    security(("bearer" = [])),
    responses(
        (status = 200, body = DoorOpenLogResponse),
        (status = 400, description = "door_id or duration missing, or negative duration")
    )
)]
pub async fn record_door_open(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DoorOpenLogRequest>,
) -> Result<Json<DoorOpenLogResponse>, ApiError> {
    let door_id = request.door_id.trim();
    if door_id.is_empty() {
        return Err(ApiError::missing_field("door_id"));
    }
    let duration = request.duration.ok_or_else(|| ApiError::missing_field("duration"))?;
    if duration < 0 {
        return Err(ApiError::bad_request("duration must not be negative").with_code("invalid_duration"));
    }

    let log = state.store.insert_door_open_log(NewDoorOpenLog {
        door_id: door_id.to_string(),
        access_id: request.access_id.trim().to_string(),
        username: request.username.trim().to_string(),
        duration,
        created_at: Utc::now(),
    })?;

    Ok(Json(DoorOpenLogResponse {
        status: "success".to_string(),
        log,
    }))
}
