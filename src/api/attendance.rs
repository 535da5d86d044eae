// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use super::ApiJson;
use chrono::{Duration, Utc};
use tracing::info;

use crate::{
    error::ApiError,
    models::{AttendanceRequest, AttendanceResponse},
    state::AppState,
    storage::{Arrow, AttendanceRecord, DailyCount, NewAttendance},
};

const SUMMARY_DAYS: i64 = 7;

fn required(value: &Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::missing_field(field))
}

#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AttendanceRequest,
    tag = "Attendance",
    security(("bearer" = [])),
    responses(
        (status = 200, body = AttendanceResponse),
        (status = 400, description = "Missing access_id or arrow, or arrow not in/out"),
        (status = 404, description = "access_id not found")
    )
)]
pub async fn record_attendance(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AttendanceRequest>,
) -> Result<Json<AttendanceResponse>, ApiError> {
    let access_id = required(&request.access_id, "access_id")?;
    let arrow_raw = required(&request.arrow, "arrow")?;
    let arrow = Arrow::parse(&arrow_raw).ok_or_else(|| {
        ApiError::bad_request("arrow must be \"in\" or \"out\"").with_code("invalid_arrow")
    })?;

    let owner = state
        .store
        .find_doorlock_user(&access_id)?
        .ok_or_else(|| ApiError::not_found("access_id not found").with_code("access_id_not_found"))?;

    let attendance = state.store.insert_attendance(NewAttendance {
        username: owner.name,
        access_id,
        status: "success".to_string(),
        arrow,
        created_at: Utc::now(),
    })?;
    info!(attendance_id = attendance.id, access_id = %attendance.access_id, "attendance recorded");

    Ok(Json(AttendanceResponse {
        status: true,
        attendance,
    }))
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    tag = "Attendance",
    security(("bearer" = [])),
    responses((status = 200, description = "Newest first", body = [AttendanceRecord]))
)]
pub async fn list_attendance(State(state): State<AppState>) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
    Ok(Json(state.store.list_attendance()?))
}

/// Attendance per UTC day over the last week.
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    tag = "Attendance",
    security(("bearer" = [])),
    responses((status = 200, description = "Newest day first, at most 7 rows", body = [DailyCount]))
)]
pub async fn attendance_summary(State(state): State<AppState>) -> Result<Json<Vec<DailyCount>>, ApiError> {
    let since = Utc::now() - Duration::days(SUMMARY_DAYS);
    let mut days = state.store.daily_attendance(since)?;
    days.truncate(SUMMARY_DAYS as usize);
    Ok(Json(days))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestGateway;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn records_under_owner_name() {
        let gw = TestGateway::new();
        let (status, body) = gw
            .post("/api/attendance", json!({"access_id": "A002", "arrow": "in"}), Some(&gw.token()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["attendance"]["username"], "Citra");
        assert_eq!(body["attendance"]["arrow"], "in");
        assert_eq!(body["attendance"]["status"], "success");
    }

    #[tokio::test]
    async fn validation_and_lookup_errors() {
        let gw = TestGateway::new();
        let token = gw.token();

        let (status, body) = gw.post("/api/attendance", json!({"arrow": "in"}), Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "access_id_required");

        let (status, body) = gw.post("/api/attendance", json!({"access_id": "A001"}), Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "arrow_required");

        let (status, body) = gw
            .post("/api/attendance", json!({"access_id": "A001", "arrow": "up"}), Some(&token))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "invalid_arrow");

        let (status, _) = gw
            .post("/api/attendance", json!({"access_id": "Z999", "arrow": "out"}), Some(&token))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_and_summary() {
        let gw = TestGateway::new();
        let token = gw.token();
        for access_id in ["A001", "A002", "A001"] {
            gw.post(
                "/api/device/events/attendance",
                json!({"access_id": access_id, "arrow": "in"}),
                Some(&token),
            )
            .await;
        }

        let (_, list) = gw.get("/api/attendance", Some(&token)).await;
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0]["id"], 3);

        let (status, summary) = gw.get("/api/attendance/summary", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary[0]["count"], 3);
        assert_eq!(
            summary[0]["date"],
            chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
        );
    }
}
