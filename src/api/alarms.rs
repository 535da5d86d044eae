// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use super::ApiJson;

use crate::{
    alarms::{raise_alarm, AlarmRequest},
    error::ApiError,
    models::AlarmResponse,
    state::AppState,
    storage::AlarmRecord,
};

/// Record an alarm and notify operators.
///
/// The response is sent once the alarm is stored; notification delivery
/// happens afterwards and never changes the outcome.
#[utoipa::path(
    post,
    path = "/api/alarm",
    request_body = AlarmRequest,
    tag = "Alarms",
    security(("bearer" = [])),
    responses(
        (status = 200, body = AlarmResponse),
        (status = 400, description = "alarm_type missing, or access_id missing for a door-held-open alarm"),
        (status = 404, description = "access_id not found")
    )
)]
pub async fn create_alarm(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AlarmRequest>,
) -> Result<Json<AlarmResponse>, ApiError> {
    let alarm = raise_alarm(state.store.as_ref(), &state.notifier, &request)?;
    Ok(Json(AlarmResponse { status: true, alarm }))
}

#[utoipa::path(
    get,
    path = "/api/alarms",
    tag = "Alarms",
    security(("bearer" = [])),
    responses((status = 200, description = "Newest first", body = [AlarmRecord]))
)]
pub async fn list_alarms(State(state): State<AppState>) -> Result<Json<Vec<AlarmRecord>>, ApiError> {
    Ok(Json(state.store.list_alarms()?))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestGateway;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn failed_entry_alarm_recorded_and_notified() {
        let gw = TestGateway::new();
        let (status, body) = gw
            .post("/api/alarm", json!({"alarm_type": 1, "access_id": "A001"}), Some(&gw.token()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], true);
        assert_eq!(body["alarm"]["username"], "Budi");
        assert_eq!(body["alarm"]["reason"], "3 failed entry attempts");

        gw.sink.wait_for(1).await;
        assert!(gw.sink.messages()[0].contains("Budi"));
    }

    #[tokio::test]
    async fn held_open_alarm_validation() {
        let gw = TestGateway::new();
        let token = gw.token();

        let (status, body) = gw.post("/api/alarm", json!({"alarm_type": 2}), Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "access_id_required");

        let (status, body) = gw
            .post("/api/alarm", json!({"alarm_type": 2, "access_id": "Z999"}), Some(&token))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error_code"], "access_id_not_found");

        assert!(gw.state.store.list_alarms().unwrap().is_empty());
    }

    #[tokio::test]
    async fn alarm_type_is_required() {
        let gw = TestGateway::new();
        let (status, body) = gw
            .post("/api/alarm", json!({"access_id": "A001"}), Some(&gw.token()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "alarm_type_required");
        assert!(gw.state.store.list_alarms().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_alarm_body_is_a_bad_request() {
        let gw = TestGateway::new();
        let (status, body) = gw
            .post("/api/alarm", json!({"alarm_type": "one"}), Some(&gw.token()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "invalid_body");
    }

    #[tokio::test]
    async fn unknown_card_failed_entry_is_listed_as_unknown() {
        let gw = TestGateway::new();
        let token = gw.token();

        let (status, body) = gw
            .post("/api/alarm", json!({"alarm_type": 1, "access_id": "Z999"}), Some(&token))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["alarm"]["username"], "Unknown");

        let (_, body) = gw.get("/api/alarms", Some(&token)).await;
        assert_eq!(body[0]["username"], "Unknown");
        assert_eq!(body[0]["access_id"], "Z999");
    }

    #[tokio::test]
    async fn device_event_alias_and_listing() {
        let gw = TestGateway::new();
        let token = gw.token();

        gw.post("/api/device/events/alarm", json!({"alarm_type": 9}), Some(&token)).await;
        gw.post("/api/alarm", json!({"alarm_type": 2, "access_id": "A003"}), Some(&token)).await;

        let (status, body) = gw.get("/api/alarms", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["username"], "Dewi");
        assert_eq!(list[1]["username"], "System");
        assert_eq!(list[1]["reason"], "Unknown");
    }

    #[tokio::test]
    async fn notification_failure_does_not_change_response() {
        let gw = TestGateway::with_failing_sink();
        let (status, _) = gw
            .post("/api/alarm", json!({"alarm_type": 1}), Some(&gw.token()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(gw.state.store.list_alarms().unwrap().len(), 1);
    }
}
