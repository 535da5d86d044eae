// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::alarms::AlarmError;
use crate::devices::DeviceError;
use crate::dispatch::DispatchError;
use crate::envelope::CipherError;
use crate::storage::StoreError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Field-level code for validation failures (e.g. `access_id_required`).
    pub code: Option<String>,
    /// Diagnostic detail for internal-facing failures.
    pub details: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// A required field is missing or empty.
    pub fn missing_field(field: &str) -> Self {
        Self::bad_request(format!("{field} is required")).with_code(format!("{field}_required"))
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request("invalid request body")
            .with_code("invalid_body")
            .with_details(rejection.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(what) => ApiError::conflict(format!("{what} already exists")),
            other => {
                error!(error = %other, "store operation failed");
                ApiError::internal("storage error")
            }
        }
    }
}

impl From<CipherError> for ApiError {
    fn from(e: CipherError) -> Self {
        match e {
            CipherError::Decrypt => ApiError::unauthorized("failed to decrypt payload"),
            other => {
                error!(error = %other, "envelope encryption failed");
                ApiError::internal("failed to encrypt response")
            }
        }
    }
}

impl From<DeviceError> for ApiError {
    fn from(e: DeviceError) -> Self {
        match e {
            DeviceError::UnknownClass(_) => ApiError::not_found(e.to_string()),
            DeviceError::InvalidValue { .. } => {
                ApiError::bad_request(e.to_string()).with_code("invalid_status")
            }
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::MissingField(field) => ApiError::missing_field(field),
            DispatchError::InvalidDeviceId(_) => {
                ApiError::bad_request(e.to_string()).with_code("invalid_device_id")
            }
            DispatchError::Encode(_) => ApiError::internal("failed to encode command"),
            DispatchError::Transport(t) => {
                ApiError::internal("failed to deliver command").with_details(t.to_string())
            }
        }
    }
}

impl From<AlarmError> for ApiError {
    fn from(e: AlarmError) -> Self {
        match e {
            AlarmError::AlarmTypeRequired => ApiError::missing_field("alarm_type"),
            AlarmError::AccessIdRequired => ApiError::missing_field("access_id"),
            AlarmError::UnknownAccessId(_) => {
                ApiError::not_found("access_id not found").with_code("access_id_not_found")
            }
            AlarmError::Store(inner) => inner.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::TransportError;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let conflict = ApiError::conflict("dup");
        assert_eq!(conflict.status, StatusCode::CONFLICT);

        let field = ApiError::missing_field("door_id");
        assert_eq!(field.status, StatusCode::BAD_REQUEST);
        assert_eq!(field.code.as_deref(), Some("door_id_required"));
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }

    #[tokio::test]
    async fn transport_failures_carry_details() {
        let err: ApiError = DispatchError::Transport(TransportError::NotConnected).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let response = err.into_response();
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error"], "failed to deliver command");
        assert_eq!(body["details"], "MQTT client is not connected");
    }

    #[test]
    fn store_errors_map_to_taxonomy() {
        let failed: ApiError = StoreError::Seed("admin password".into()).into();
        assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failed.message, "storage error");

        let dup: ApiError = StoreError::Conflict("username".into()).into();
        assert_eq!(dup.status, StatusCode::CONFLICT);
        assert_eq!(dup.message, "username already exists");
    }

    #[test]
    fn cipher_failures_never_leak_detail() {
        let err: ApiError = CipherError::Decrypt.into();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert!(err.details.is_none());
    }
}
