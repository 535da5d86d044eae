// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Command Dispatcher
//!
//! Turns operator requests into device commands published on the broker:
//!
//! ```text
//! doorlock/<door_id>/control   {"command": "unlock", "timestamp": "..."}
//! buzzer/<buzzer_id>/control   {"command": "on", "duration": 5, "timestamp": "..."}
//! ```
//!
//! Delivery is at-most-once. A failed publish is reported to the caller and
//! never retried.

pub mod mqtt;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{info, warn};

pub use mqtt::{BrokerSettings, MqttPublisher};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("MQTT client is not connected")]
    NotConnected,

    #[error("publish rejected: {0}")]
    Publish(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid device id: {0:?}")]
    InvalidDeviceId(String),

    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Outbound transport for command messages.
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool;
}

/// JSON body published to a device topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandMessage {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    pub timestamp: String,
}

impl CommandMessage {
    pub fn new(command: &str, duration: Option<u32>) -> Self {
        Self {
            command: command.to_string(),
            duration,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Device ids become topic levels, so separators and wildcards are refused.
fn validate_device_id(field: &'static str, id: &str) -> Result<(), DispatchError> {
    if id.trim().is_empty() {
        return Err(DispatchError::MissingField(field));
    }
    if id.contains(['/', '+', '#']) {
        return Err(DispatchError::InvalidDeviceId(id.to_string()));
    }
    Ok(())
}

pub fn doorlock_topic(door_id: &str) -> String {
    format!("doorlock/{door_id}/control")
}

pub fn buzzer_topic(buzzer_id: &str) -> String {
    format!("buzzer/{buzzer_id}/control")
}

#[derive(Clone)]
pub struct CommandDispatcher {
    publisher: Arc<dyn CommandPublisher>,
}

impl CommandDispatcher {
    pub fn new(publisher: Arc<dyn CommandPublisher>) -> Self {
        Self { publisher }
    }

    pub fn is_connected(&self) -> bool {
        self.publisher.is_connected()
    }

    pub async fn send_door_command(&self, door_id: &str, command: &str) -> Result<String, DispatchError> {
        validate_device_id("door_id", door_id)?;
        let topic = doorlock_topic(door_id);
        self.send(&topic, CommandMessage::new(command, None)).await?;
        Ok(topic)
    }

    pub async fn send_buzzer_command(
        &self,
        buzzer_id: &str,
        command: &str,
        duration: Option<u32>,
    ) -> Result<String, DispatchError> {
        validate_device_id("buzzer_id", buzzer_id)?;
        let topic = buzzer_topic(buzzer_id);
        self.send(&topic, CommandMessage::new(command, duration)).await?;
        Ok(topic)
    }

    async fn send(&self, topic: &str, message: CommandMessage) -> Result<(), DispatchError> {
        if message.command.trim().is_empty() {
            return Err(DispatchError::MissingField("command"));
        }

        let payload = serde_json::to_vec(&message)?;
        match self.publisher.publish(topic, payload).await {
            Ok(()) => {
                info!(topic = %topic, command = %message.command, "command published");
                Ok(())
            }
            Err(e) => {
                warn!(topic = %topic, error = %e, "command publish failed");
                Err(e.into())
            }
        }
    }
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("connected", &self.is_connected())
            .finish()
    }
}
