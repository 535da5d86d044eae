// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process gateway fixtures for unit and router tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::alarms::{AlarmNotifier, DisabledSink, NotificationSink, NotifyError};
use crate::auth::{Argon2Verifier, TokenIssuer};
use crate::config::LoginPolicy;
use crate::dispatch::{CommandDispatcher, CommandPublisher, TransportError};
use crate::envelope::EnvelopeCipher;
use crate::state::AppState;
use crate::storage::{seed_store, Credential, GatewayStore, RedbStore, SeedOptions};

pub const TEST_ENVELOPE_KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";
pub const TEST_JWT_SECRET: &[u8] = b"test-session-secret";

fn fast_verifier() -> Argon2Verifier {
    Argon2Verifier::with_params(8, 1, 1).unwrap()
}

/// Publisher that records every publish instead of talking to a broker.
#[derive(Debug)]
pub struct RecordingPublisher {
    connected: AtomicBool,
    attempts: AtomicUsize,
    sent: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingPublisher {
    pub fn connected() -> Self {
        Self::with_connection(true)
    }

    pub fn disconnected() -> Self {
        Self::with_connection(false)
    }

    fn with_connection(connected: bool) -> Self {
        Self {
            connected: AtomicBool::new(connected),
            attempts: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Successfully published `(topic, payload)` pairs, oldest first.
    pub fn sent(&self) -> Vec<(String, Vec<u8>)> {
        self.sent.lock().unwrap().clone()
    }

    /// Publish calls, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.sent.lock().unwrap().push((topic.to_string(), payload));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Notification sink that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Wait until at least `count` messages arrived, failing after two seconds.
    pub async fn wait_for(&self, count: usize) {
        let waited = tokio::time::timeout(Duration::from_secs(2), async {
            while self.messages.lock().unwrap().len() < count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "expected {count} notification(s)");
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// A fully wired gateway backed by a temporary database.
///
/// Seeded with an active `admin`/`admin123` operator, an inactive
/// `retired`/`retired123` operator and the demo doorlock users.
pub struct TestGateway {
    pub state: AppState,
    pub publisher: Arc<RecordingPublisher>,
    pub sink: Arc<RecordingSink>,
    _dir: TempDir,
}

impl TestGateway {
    pub fn new() -> Self {
        Self::build(LoginPolicy::default(), RecordingPublisher::connected(), false)
    }

    pub fn with_login_policy(seal_errors: bool, allow_plain: bool) -> Self {
        let policy = LoginPolicy {
            seal_errors,
            allow_plain,
        };
        Self::build(policy, RecordingPublisher::connected(), false)
    }

    pub fn with_disconnected_broker() -> Self {
        Self::build(LoginPolicy::default(), RecordingPublisher::disconnected(), false)
    }

    /// Alarm notifications always fail to deliver.
    pub fn with_failing_sink() -> Self {
        Self::build(LoginPolicy::default(), RecordingPublisher::connected(), true)
    }

    fn build(login: LoginPolicy, publisher: RecordingPublisher, failing_sink: bool) -> Self {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RedbStore::open(&dir.path().join("gw.redb")).unwrap());
        let verifier = fast_verifier();

        seed_store(
            store.as_ref(),
            &verifier,
            &SeedOptions {
                admin_username: Some("admin".into()),
                admin_password: Some("admin123".into()),
                demo_data: true,
            },
        )
        .unwrap();
        store
            .insert_credential(&Credential {
                username: "retired".into(),
                password_hash: verifier.hash("retired123").unwrap(),
                role: "operator".into(),
                is_active: false,
                created_at: Utc::now(),
            })
            .unwrap();

        let publisher = Arc::new(publisher);
        let sink = Arc::new(RecordingSink::default());
        let notifier = if failing_sink {
            AlarmNotifier::new(Arc::new(DisabledSink))
        } else {
            AlarmNotifier::new(sink.clone())
        };

        let state = AppState::new(
            store,
            EnvelopeCipher::new(TEST_ENVELOPE_KEY).unwrap(),
            TokenIssuer::new(TEST_JWT_SECRET),
        )
        .with_verifier(Arc::new(verifier))
        .with_dispatcher(CommandDispatcher::new(publisher.clone()))
        .with_notifier(notifier)
        .with_login_policy(login);

        Self {
            state,
            publisher,
            sink,
            _dir: dir,
        }
    }

    pub fn router(&self) -> Router {
        crate::api::router(self.state.clone())
    }

    /// Session token for the seeded admin.
    pub fn token(&self) -> String {
        self.state.tokens.issue("admin").unwrap()
    }

    pub fn seal(&self, value: &impl Serialize) -> String {
        self.state.cipher.seal_json(value).unwrap()
    }

    pub fn open<T: DeserializeOwned>(&self, payload: &Value) -> T {
        self.state.cipher.open_json(payload.as_str().unwrap()).unwrap()
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, path: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}
