// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Alarm Notifier
//!
//! Alarm reports from the door controller are classified, persisted, and
//! forwarded to the notification channel:
//!
//! | Code | Kind                   | Reason                     | Access id  |
//! |------|------------------------|----------------------------|------------|
//! | 1    | repeated failed entry  | `3 failed entry attempts`  | optional   |
//! | 2    | door held open         | `Door open > 1 minute`     | required   |
//! | *    | anything else          | `Unknown`                  | pass-through |
//!
//! The record is written before the caller gets its response. Notification
//! happens afterwards on a detached task and never affects the response.

pub mod notifier;
pub mod telegram;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::storage::{AlarmRecord, GatewayStore, NewAlarm, StoreError};

pub use notifier::{AlarmNotifier, DisabledSink, NotificationSink, NotifyError};
pub use telegram::TelegramSink;

/// Owner name recorded when a failed-entry alarm cannot be attributed.
pub const UNKNOWN_USER: &str = "Unknown";

/// Owner name recorded for unrecognised alarm types without a username.
pub const SYSTEM_USER: &str = "System";

#[derive(Debug, thiserror::Error)]
pub enum AlarmError {
    #[error("alarm_type is required")]
    AlarmTypeRequired,

    #[error("access_id is required for this alarm type")]
    AccessIdRequired,

    #[error("access_id not found: {0}")]
    UnknownAccessId(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmKind {
    RepeatedFailedEntry,
    DoorHeldOpen,
    Other,
}

impl AlarmKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => AlarmKind::RepeatedFailedEntry,
            2 => AlarmKind::DoorHeldOpen,
            _ => AlarmKind::Other,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            AlarmKind::RepeatedFailedEntry => "3 failed entry attempts",
            AlarmKind::DoorHeldOpen => "Door open > 1 minute",
            AlarmKind::Other => "Unknown",
        }
    }
}

/// Alarm report as sent by the controller.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AlarmRequest {
    #[serde(default)]
    pub alarm_type: Option<i64>,
    #[serde(default)]
    pub access_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Resolve the alarm's reason and owner. No record is written.
pub fn classify(store: &dyn GatewayStore, request: &AlarmRequest) -> Result<NewAlarm, AlarmError> {
    let kind = request
        .alarm_type
        .map(AlarmKind::from_code)
        .ok_or(AlarmError::AlarmTypeRequired)?;
    let access_id = request
        .access_id
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let username = match kind {
        AlarmKind::RepeatedFailedEntry => {
            if access_id.is_empty() {
                UNKNOWN_USER.to_string()
            } else {
                store
                    .find_doorlock_user(&access_id)?
                    .map(|user| user.name)
                    .unwrap_or_else(|| UNKNOWN_USER.to_string())
            }
        }
        AlarmKind::DoorHeldOpen => {
            if access_id.is_empty() {
                return Err(AlarmError::AccessIdRequired);
            }
            store
                .find_doorlock_user(&access_id)?
                .map(|user| user.name)
                .ok_or_else(|| AlarmError::UnknownAccessId(access_id.clone()))?
        }
        AlarmKind::Other => request
            .username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(SYSTEM_USER)
            .to_string(),
    };

    Ok(NewAlarm {
        username,
        access_id,
        reason: kind.reason().to_string(),
        created_at: Utc::now(),
    })
}

/// Classify, persist, then hand the record to the notifier.
pub fn raise_alarm(
    store: &dyn GatewayStore,
    notifier: &AlarmNotifier,
    request: &AlarmRequest,
) -> Result<AlarmRecord, AlarmError> {
    let record = store.insert_alarm(classify(store, request)?)?;
    info!(
        alarm_id = record.id,
        reason = %record.reason,
        username = %record.username,
        "alarm recorded"
    );

    // The handle is dropped: the request path never waits on delivery.
    let _ = notifier.notify_detached(record.clone());
    Ok(record)
}
