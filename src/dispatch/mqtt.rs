// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! MQTT transport for device commands.
//!
//! The broker is contacted once at startup. If that attempt fails the
//! publisher stays disabled for the life of the process and every publish
//! reports [`TransportError::NotConnected`]. After a successful connect a
//! background task drives the rumqttc event loop until shutdown and keeps
//! the connectivity flag current.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::{CommandPublisher, TransportError};

const DEFAULT_MQTT_PORT: u16 = 1883;

/// Requests buffered between `publish` and the event loop. A publish
/// resolves once the event loop has taken the previous request.
const REQUEST_CHANNEL_CAPACITY: usize = 1;

#[derive(Debug, Clone)]
pub struct BrokerSettings {
    /// `tcp://host:port` or `mqtt://host:port`
    pub url: String,
    pub client_id: String,
    pub connect_timeout: Duration,
    pub keep_alive: Duration,
}

impl BrokerSettings {
    pub fn new(url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client_id: client_id.into(),
            connect_timeout: Duration::from_secs(5),
            keep_alive: Duration::from_secs(30),
        }
    }
}

/// Split a broker URL into host and port.
pub fn parse_broker_url(raw: &str) -> Option<(String, u16)> {
    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "tcp" | "mqtt") {
        return None;
    }
    let host = url.host_str()?.to_string();
    Some((host, url.port().unwrap_or(DEFAULT_MQTT_PORT)))
}

pub struct MqttPublisher {
    client: Option<AsyncClient>,
    connected: Arc<AtomicBool>,
}

impl MqttPublisher {
    /// A publisher that never connects.
    pub fn disabled() -> Self {
        Self {
            client: None,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make the single connection attempt.
    ///
    /// Never fails: on any error the returned publisher is disabled and a
    /// warning is logged.
    pub async fn connect(settings: &BrokerSettings, shutdown: CancellationToken) -> Self {
        let Some((host, port)) = parse_broker_url(&settings.url) else {
            warn!(broker_url = %settings.url, "invalid MQTT broker URL, command publishing disabled");
            return Self::disabled();
        };

        let mut options = MqttOptions::new(&settings.client_id, host, port);
        options.set_keep_alive(settings.keep_alive);
        options.set_clean_session(true);

        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);

        match tokio::time::timeout(settings.connect_timeout, await_connack(&mut eventloop)).await {
            Ok(Ok(())) => {
                info!(broker_url = %settings.url, client_id = %settings.client_id, "connected to MQTT broker");
            }
            Ok(Err(reason)) => {
                warn!(broker_url = %settings.url, error = %reason, "MQTT connect failed, command publishing disabled");
                return Self::disabled();
            }
            Err(_) => {
                warn!(broker_url = %settings.url, "MQTT connect timed out, command publishing disabled");
                return Self::disabled();
            }
        }

        let connected = Arc::new(AtomicBool::new(true));
        tokio::spawn(drive_event_loop(
            client.clone(),
            eventloop,
            connected.clone(),
            shutdown,
        ));

        Self {
            client: Some(client),
            connected,
        }
    }
}

async fn await_connack(eventloop: &mut EventLoop) -> Result<(), String> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return if ack.code == ConnectReturnCode::Success {
                    Ok(())
                } else {
                    Err(format!("broker refused connection: {:?}", ack.code))
                };
            }
            Ok(_) => {}
            Err(e) => return Err(e.to_string()),
        }
    }
}

/// Poll the event loop until shutdown. rumqttc reconnects on the next poll
/// after an error, so the loop pauses briefly between failures.
async fn drive_event_loop(
    client: AsyncClient,
    mut eventloop: EventLoop,
    connected: Arc<AtomicBool>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("MQTT event loop shutting down");
                let _ = client.disconnect().await;
                connected.store(false, Ordering::SeqCst);
                return;
            }
            event = eventloop.poll() => {
                match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        if !connected.swap(true, Ordering::SeqCst) {
                            info!("reconnected to MQTT broker");
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        if connected.swap(false, Ordering::SeqCst) {
                            warn!(error = %e, "lost MQTT connection");
                        }
                        tokio::select! {
                            _ = shutdown.cancelled() => {}
                            _ = tokio::time::sleep(Duration::from_secs(1)) => {}
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl CommandPublisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        let client = match &self.client {
            Some(client) if self.is_connected() => client,
            _ => return Err(TransportError::NotConnected),
        };

        client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(|e| TransportError::Publish(e.to_string()))
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
