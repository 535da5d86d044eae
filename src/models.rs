// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. Persisted records live in
//! [`crate::storage::records`] and are returned as-is where a handler lists
//! them.
//!
//! ## Model Categories
//!
//! - **Login**: operator credentials and session tokens (sealed on the wire)
//! - **Devices**: status updates and device commands
//! - **Events**: alarm, attendance and door-open reports
//! - **Reports**: trends, dashboard counters and health

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::storage::{AccessCount, AlarmRecord, AttendanceRecord, DoorOpenLog, DoorOpenStats};

// =============================================================================
// Login Models
// =============================================================================

/// Inner plaintext of the sealed login request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Inner plaintext of the sealed login response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: String,
}

/// Inner plaintext of a sealed error body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SealedError {
    pub error: String,
}

// =============================================================================
// Device Models
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeviceStatusUpdate {
    #[serde(default)]
    pub device_id: Option<String>,
    /// `open`/`closed`, `connected`/`disconnected`, or a boolean for the buzzer.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub status: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DoorCommandRequest {
    #[serde(default)]
    pub door_id: String,
    #[serde(default)]
    pub command: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BuzzerCommandRequest {
    #[serde(default)]
    pub buzzer_id: String,
    #[serde(default)]
    pub command: String,
    /// Seconds to sound, if the command takes one.
    #[serde(default)]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommandResponse {
    pub status: String,
    pub message: String,
    pub topic: String,
}

// =============================================================================
// Event Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AlarmResponse {
    pub status: bool,
    pub alarm: AlarmRecord,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AttendanceRequest {
    #[serde(default)]
    pub access_id: Option<String>,
    /// `in` or `out`
    #[serde(default)]
    pub arrow: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceResponse {
    pub status: bool,
    pub attendance: AttendanceRecord,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DoorOpenLogRequest {
    #[serde(default)]
    pub door_id: String,
    #[serde(default)]
    pub access_id: String,
    #[serde(default)]
    pub username: String,
    /// Seconds the door stayed open.
    #[serde(default)]
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoorOpenLogResponse {
    pub status: String,
    pub log: DoorOpenLog,
}

// =============================================================================
// Report Models
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
pub struct FrequentAccessQuery {
    /// Trailing window in hours (default 24).
    pub hours: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FrequentAccessResponse {
    pub time_period_hours: i64,
    pub frequent_access: Vec<AccessCount>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LongOpenDoorsQuery {
    /// Minimum open duration in seconds (default 60).
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LongOpenDoorsResponse {
    pub duration_threshold_seconds: i64,
    pub long_open_doors: Vec<DoorOpenStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_attendance: u64,
    /// Alarms raised in the last 24 hours.
    pub active_alarms: u64,
    /// Attendance since UTC midnight.
    pub today_attendance: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub service: String,
    /// `connected` or `disconnected`
    pub mqtt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
}
