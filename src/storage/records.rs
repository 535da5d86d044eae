// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persisted record types and aggregate rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Identity Records
// =============================================================================

/// An operator account allowed to log in to the gateway.
///
/// Read for verification only; never returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A physical credential holder (card or PIN) known to a door.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoorlockUser {
    pub name: String,
    pub access_id: String,
    pub door_id: String,
    /// Argon2id PHC string of the PIN.
    pub pin_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Event Records
// =============================================================================

/// Direction of an attendance event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Arrow {
    In,
    Out,
}

impl Arrow {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "in" => Some(Arrow::In),
            "out" => Some(Arrow::Out),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct AttendanceRecord {
    pub id: u64,
    pub username: String,
    pub access_id: String,
    pub status: String,
    pub arrow: Arrow,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub username: String,
    pub access_id: String,
    pub status: String,
    pub arrow: Arrow,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct AlarmRecord {
    pub id: u64,
    /// Owner name, `Unknown` when unresolved.
    pub username: String,
    /// May be empty.
    pub access_id: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlarm {
    pub username: String,
    pub access_id: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct DoorOpenLog {
    pub id: u64,
    pub door_id: String,
    pub access_id: String,
    pub username: String,
    /// Seconds the door stayed open.
    pub duration: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDoorOpenLog {
    pub door_id: String,
    pub access_id: String,
    pub username: String,
    pub duration: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Aggregate Rows
// =============================================================================

/// Attendance count per `(access_id, username)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct AccessCount {
    pub access_id: String,
    pub username: String,
    pub access_count: u64,
}

/// Door-open statistics per `(door_id, access_id, username)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct DoorOpenStats {
    pub door_id: String,
    pub access_id: String,
    pub username: String,
    pub avg_duration: f64,
    pub occurrence_count: u64,
}

/// Attendance count for one calendar day (UTC).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct DailyCount {
    /// `YYYY-MM-DD`
    pub date: String,
    pub count: u64,
}
