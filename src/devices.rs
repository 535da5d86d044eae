// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Device State Registry
//!
//! In-memory view of the four peripherals attached to the controller:
//!
//! | Class    | Values                        | Default          |
//! |----------|-------------------------------|------------------|
//! | `door`   | `open` / `closed`             | `closed`         |
//! | `reader` | `connected` / `disconnected`  | `disconnected`   |
//! | `pinpad` | `connected` / `disconnected`  | `disconnected`   |
//! | `buzzer` | `true` / `false`              | `false`          |
//!
//! The snapshot is reset to defaults on every start and never persisted.
//! Reads clone the whole snapshot under the read lock; writes hold the write
//! lock only for the single-entry mutation.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("unknown device class: {0}")]
    UnknownClass(String),

    #[error("invalid status {value:?} for {class}")]
    InvalidValue { class: DeviceClass, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Door,
    Reader,
    Pinpad,
    Buzzer,
}

impl DeviceClass {
    pub const ALL: [DeviceClass; 4] = [
        DeviceClass::Door,
        DeviceClass::Reader,
        DeviceClass::Pinpad,
        DeviceClass::Buzzer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Door => "door",
            DeviceClass::Reader => "reader",
            DeviceClass::Pinpad => "pinpad",
            DeviceClass::Buzzer => "buzzer",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DeviceError> {
        match s {
            "door" => Ok(DeviceClass::Door),
            "reader" => Ok(DeviceClass::Reader),
            "pinpad" => Ok(DeviceClass::Pinpad),
            "buzzer" => Ok(DeviceClass::Buzzer),
            other => Err(DeviceError::UnknownClass(other.to_string())),
        }
    }

    /// Validate a raw value against this class's vocabulary and normalise it.
    pub fn normalize(&self, raw: &serde_json::Value) -> Result<DeviceValue, DeviceError> {
        let invalid = || DeviceError::InvalidValue {
            class: *self,
            value: raw.to_string(),
        };

        match self {
            DeviceClass::Buzzer => match raw {
                serde_json::Value::Bool(on) => Ok(DeviceValue::Flag(*on)),
                serde_json::Value::String(s) => match s.trim().to_lowercase().as_str() {
                    "on" | "true" => Ok(DeviceValue::Flag(true)),
                    "off" | "false" => Ok(DeviceValue::Flag(false)),
                    _ => Err(invalid()),
                },
                _ => Err(invalid()),
            },
            DeviceClass::Door | DeviceClass::Reader | DeviceClass::Pinpad => {
                let allowed: &[&str] = match self {
                    DeviceClass::Door => &["open", "closed"],
                    _ => &["connected", "disconnected"],
                };
                let text = raw.as_str().ok_or_else(invalid)?.trim().to_lowercase();
                if allowed.contains(&text.as_str()) {
                    Ok(DeviceValue::Text(text))
                } else {
                    Err(invalid())
                }
            }
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum DeviceValue {
    Flag(bool),
    Text(String),
}

/// Point-in-time copy of every device's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeviceSnapshot {
    pub door: String,
    pub reader: String,
    pub pinpad: String,
    pub buzzer: bool,
    pub last_updated: DateTime<Utc>,
}

impl DeviceSnapshot {
    pub fn defaults() -> Self {
        Self {
            door: "closed".into(),
            reader: "disconnected".into(),
            pinpad: "disconnected".into(),
            buzzer: false,
            last_updated: Utc::now(),
        }
    }

    pub fn get(&self, class: DeviceClass) -> DeviceValue {
        match class {
            DeviceClass::Door => DeviceValue::Text(self.door.clone()),
            DeviceClass::Reader => DeviceValue::Text(self.reader.clone()),
            DeviceClass::Pinpad => DeviceValue::Text(self.pinpad.clone()),
            DeviceClass::Buzzer => DeviceValue::Flag(self.buzzer),
        }
    }

    fn apply(&mut self, class: DeviceClass, value: DeviceValue) {
        match (class, value) {
            (DeviceClass::Buzzer, DeviceValue::Flag(on)) => self.buzzer = on,
            (DeviceClass::Door, DeviceValue::Text(text)) => self.door = text,
            (DeviceClass::Reader, DeviceValue::Text(text)) => self.reader = text,
            (DeviceClass::Pinpad, DeviceValue::Text(text)) => self.pinpad = text,
            // normalize() only yields the shape matching the class
            _ => return,
        }
        self.last_updated = Utc::now();
    }

    #[cfg(test)]
    fn same_statuses(&self, other: &Self) -> bool {
        DeviceClass::ALL.iter().all(|c| self.get(*c) == other.get(*c))
    }
}

/// Shared handle to the device snapshot.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    inner: Arc<RwLock<DeviceSnapshot>>,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(DeviceSnapshot::defaults())),
        }
    }

    pub async fn snapshot(&self) -> DeviceSnapshot {
        self.inner.read().await.clone()
    }

    /// Validate and write one device's status. Returns the snapshot as it
    /// stood right after this write.
    pub async fn set_status(
        &self,
        class: DeviceClass,
        raw: &serde_json::Value,
    ) -> Result<DeviceSnapshot, DeviceError> {
        let value = class.normalize(raw)?;

        let mut guard = self.inner.write().await;
        guard.apply(class, value);
        Ok(guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn starts_with_defaults_for_all_classes() {
        let snap = DeviceRegistry::new().snapshot().await;
        assert_eq!(snap.get(DeviceClass::Door), DeviceValue::Text("closed".into()));
        assert_eq!(snap.get(DeviceClass::Reader), DeviceValue::Text("disconnected".into()));
        assert_eq!(snap.get(DeviceClass::Pinpad), DeviceValue::Text("disconnected".into()));
        assert_eq!(snap.get(DeviceClass::Buzzer), DeviceValue::Flag(false));
    }

    #[tokio::test]
    async fn snapshot_serializes_flat() {
        let snap = DeviceRegistry::new().snapshot().await;
        let value = serde_json::to_value(&snap).unwrap();
        assert_eq!(value["door"], "closed");
        assert_eq!(value["pinpad"], "disconnected");
        assert_eq!(value["buzzer"], false);
        assert!(value["last_updated"].is_string());
    }

    #[tokio::test]
    async fn set_status_updates_one_entry_and_timestamp() {
        let registry = DeviceRegistry::new();
        let before = registry.snapshot().await;

        let after = registry.set_status(DeviceClass::Door, &json!("OPEN")).await.unwrap();
        assert_eq!(after.get(DeviceClass::Door), DeviceValue::Text("open".into()));
        assert_eq!(after.get(DeviceClass::Reader), before.get(DeviceClass::Reader));
        assert!(after.last_updated >= before.last_updated);
        assert_eq!(registry.snapshot().await, after);
    }

    #[tokio::test]
    async fn buzzer_accepts_bool_and_words() {
        let registry = DeviceRegistry::new();
        for (raw, expected) in [
            (json!(true), true),
            (json!("off"), false),
            (json!("on"), true),
            (json!("false"), false),
        ] {
            let snap = registry.set_status(DeviceClass::Buzzer, &raw).await.unwrap();
            assert_eq!(snap.get(DeviceClass::Buzzer), DeviceValue::Flag(expected));
        }
    }

    #[tokio::test]
    async fn out_of_vocabulary_values_rejected() {
        let registry = DeviceRegistry::new();
        for (class, raw) in [
            (DeviceClass::Door, json!("ajar")),
            (DeviceClass::Door, json!(true)),
            (DeviceClass::Reader, json!("open")),
            (DeviceClass::Pinpad, json!(1)),
            (DeviceClass::Buzzer, json!("loud")),
        ] {
            let err = registry.set_status(class, &raw).await.unwrap_err();
            assert!(matches!(err, DeviceError::InvalidValue { .. }));
        }
        assert!(registry.snapshot().await.same_statuses(&DeviceSnapshot::defaults()));
    }

    #[test]
    fn unknown_class_rejected() {
        assert!(matches!(DeviceClass::parse("camera"), Err(DeviceError::UnknownClass(_))));
        assert_eq!(DeviceClass::parse("pinpad").unwrap(), DeviceClass::Pinpad);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_readers_never_see_partial_state() {
        let registry = DeviceRegistry::new();

        let writer = {
            let registry = registry.clone();
            tokio::spawn(async move {
                for i in 0..200 {
                    let value = if i % 2 == 0 { "open" } else { "closed" };
                    registry.set_status(DeviceClass::Door, &json!(value)).await.unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    for _ in 0..200 {
                        let snap = registry.snapshot().await;
                        assert!(snap.door == "open" || snap.door == "closed");
                        assert_eq!(snap.reader, "disconnected");
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
        assert_eq!(registry.snapshot().await.door, "closed");
    }

    #[tokio::test]
    async fn quiescent_registry_gives_every_reader_the_same_snapshot() {
        let registry = DeviceRegistry::new();
        registry.set_status(DeviceClass::Door, &json!("open")).await.unwrap();
        registry.set_status(DeviceClass::Buzzer, &json!(true)).await.unwrap();
        let written = registry.set_status(DeviceClass::Pinpad, &json!("connected")).await.unwrap();

        let readers: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.snapshot().await })
            })
            .collect();

        for reader in readers {
            let snap = reader.await.unwrap();
            assert_eq!(snap, written);
            assert_eq!(snap.last_updated, written.last_updated);
        }
    }
}
