// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use super::ApiJson;

use crate::{
    auth::Auth,
    error::ApiError,
    models::{BuzzerCommandRequest, CommandResponse, DoorCommandRequest},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/api/control/doorlock",
    request_body = DoorCommandRequest,
    tag = "Control",
    security(("bearer" = [])),
    responses(
        (status = 200, body = CommandResponse),
        (status = 400, description = "Missing or invalid door_id or command"),
        (status = 500, description = "Broker unavailable or publish rejected")
    )
)]
pub async fn control_doorlock(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiJson(request): ApiJson<DoorCommandRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let topic = state
        .dispatcher
        .send_door_command(request.door_id.trim(), request.command.trim())
        .await?;
    tracing::info!(operator = %user.username, door_id = %request.door_id, "door command sent");

    Ok(Json(CommandResponse {
        status: "success".to_string(),
        message: format!("command {} sent to door {}", request.command.trim(), request.door_id.trim()),
        topic,
    }))
}

#[utoipa::path(
    post,
    path = "/api/control/buzzer",
    request_body = BuzzerCommandRequest,
    tag = "Control",
    security(("bearer" = [])),
    responses(
        (status = 200, body = CommandResponse),
        (status = 400, description = "Missing or invalid buzzer_id or command"),
        (status = 500, description = "Broker unavailable or publish rejected")
    )
)]
pub async fn control_buzzer(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BuzzerCommandRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let topic = state
        .dispatcher
        .send_buzzer_command(request.buzzer_id.trim(), request.command.trim(), request.duration)
        .await?;

    Ok(Json(CommandResponse {
        status: "success".to_string(),
        message: format!(
            "command {} sent to buzzer {}",
            request.command.trim(),
            request.buzzer_id.trim()
        ),
        topic,
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestGateway;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn door_command_published() {
        let gw = TestGateway::new();
        let (status, body) = gw
            .post("/api/control/doorlock", json!({"door_id": "D01", "command": "unlock"}), Some(&gw.token()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["topic"], "doorlock/D01/control");

        let sent = gw.publisher.sent();
        assert_eq!(sent.len(), 1);
        let payload: serde_json::Value = serde_json::from_slice(&sent[0].1).unwrap();
        assert_eq!(payload["command"], "unlock");
    }

    #[tokio::test]
    async fn buzzer_command_with_duration() {
        let gw = TestGateway::new();
        let (status, _) = gw
            .post(
                "/api/control/buzzer",
                json!({"buzzer_id": "B01", "command": "on", "duration": 3}),
                Some(&gw.token()),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let sent = gw.publisher.sent();
        assert_eq!(sent[0].0, "buzzer/B01/control");
        let payload: serde_json::Value = serde_json::from_slice(&sent[0].1).unwrap();
        assert_eq!(payload["duration"], 3);
    }

    #[tokio::test]
    async fn missing_fields_rejected() {
        let gw = TestGateway::new();
        let (status, body) = gw
            .post("/api/control/doorlock", json!({"command": "unlock"}), Some(&gw.token()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "door_id_required");

        let (status, body) = gw
            .post("/api/control/buzzer", json!({"buzzer_id": "B01"}), Some(&gw.token()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "command_required");
        assert!(gw.publisher.sent().is_empty());
    }

    #[tokio::test]
    async fn disconnected_broker_is_500_with_details() {
        let gw = TestGateway::with_disconnected_broker();
        let (status, body) = gw
            .post("/api/control/doorlock", json!({"door_id": "D01", "command": "unlock"}), Some(&gw.token()))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "failed to deliver command");
        assert_eq!(body["details"], "MQTT client is not connected");
    }
}
