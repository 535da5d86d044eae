// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Detached alarm notification.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::storage::AlarmRecord;

/// Western Indonesia Time (UTC+07:00, no DST).
const WIB_OFFSET_SECS: i32 = 7 * 3600;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification channel is not configured")]
    NotConfigured,

    #[error("notification request failed: {0}")]
    Request(String),

    #[error("notification rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Delivery channel for alarm messages.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Sink used when no channel is configured. Every send fails.
#[derive(Debug, Default)]
pub struct DisabledSink;

#[async_trait]
impl NotificationSink for DisabledSink {
    async fn send(&self, _text: &str) -> Result<(), NotifyError> {
        Err(NotifyError::NotConfigured)
    }
}

fn wib() -> FixedOffset {
    FixedOffset::east_opt(WIB_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Render an alarm time as `2 Jan 2006, 15:04:05 WIB`.
pub fn format_wib(at: DateTime<Utc>) -> String {
    at.with_timezone(&wib())
        .format("%-d %b %Y, %H:%M:%S WIB")
        .to_string()
}

pub fn format_message(alarm: &AlarmRecord) -> String {
    format!(
        "🚨 ALARM DETECTED 🚨\n\nName: {}\nAccess ID: {}\nReason: {}\nTime: {}",
        alarm.username,
        alarm.access_id,
        alarm.reason,
        format_wib(alarm.created_at),
    )
}

#[derive(Clone)]
pub struct AlarmNotifier {
    sink: Arc<dyn NotificationSink>,
}

impl AlarmNotifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Submit a notification on its own task and return immediately.
    ///
    /// The task has no timeout and is never cancelled; a failed delivery is
    /// logged and dropped.
    pub fn notify_detached(&self, alarm: AlarmRecord) -> JoinHandle<()> {
        let sink = self.sink.clone();
        tokio::spawn(async move {
            let text = format_message(&alarm);
            match sink.send(&text).await {
                Ok(()) => info!(alarm_id = alarm.id, "alarm notification sent"),
                Err(e) => warn!(alarm_id = alarm.id, error = %e, "alarm notification failed"),
            }
        })
    }
}

impl std::fmt::Debug for AlarmNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlarmNotifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSink;
    use chrono::TimeZone;

    fn alarm_at(at: DateTime<Utc>) -> AlarmRecord {
        AlarmRecord {
            id: 7,
            username: "Budi".into(),
            access_id: "A001".into(),
            reason: "Door open > 1 minute".into(),
            created_at: at,
        }
    }

    #[test]
    fn wib_formatting_shifts_seven_hours() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 20, 4, 5).unwrap();
        assert_eq!(format_wib(at), "3 Jan 2024, 03:04:05 WIB");

        let morning = Utc.with_ymd_and_hms(2024, 3, 15, 1, 0, 0).unwrap();
        assert_eq!(format_wib(morning), "15 Mar 2024, 08:00:00 WIB");
    }

    #[test]
    fn message_lists_alarm_fields() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 8, 4, 5).unwrap();
        let text = format_message(&alarm_at(at));
        assert!(text.contains("Name: Budi"));
        assert!(text.contains("Access ID: A001"));
        assert!(text.contains("Reason: Door open > 1 minute"));
        assert!(text.contains("Time: 2 Jan 2024, 15:04:05 WIB"));
    }

    #[tokio::test]
    async fn detached_task_delivers_message() {
        let sink = Arc::new(RecordingSink::default());
        let notifier = AlarmNotifier::new(sink.clone());

        notifier.notify_detached(alarm_at(Utc::now())).await.unwrap();
        assert_eq!(sink.messages().len(), 1);
    }

    #[tokio::test]
    async fn failed_delivery_is_swallowed() {
        let notifier = AlarmNotifier::new(Arc::new(DisabledSink));
        let handle = notifier.notify_detached(alarm_at(Utc::now()));
        assert!(handle.await.is_ok());
    }
}
