// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use chrono::{Duration, Utc};

use crate::{error::ApiError, models::DashboardStats, state::AppState};

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    security(("bearer" = [])),
    responses((status = 200, body = DashboardStats))
)]
pub async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    let now = Utc::now();
    let midnight = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(now);

    Ok(Json(DashboardStats {
        total_users: state.store.count_credentials()?,
        total_attendance: state.store.count_attendance_since(None)?,
        active_alarms: state.store.count_alarms_since(Some(now - Duration::hours(24)))?,
        today_attendance: state.store.count_attendance_since(Some(midnight))?,
    }))
}
