// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::alarms::{AlarmNotifier, DisabledSink};
use crate::auth::{Argon2Verifier, CredentialVerifier, TokenIssuer};
use crate::config::LoginPolicy;
use crate::devices::DeviceRegistry;
use crate::dispatch::{CommandDispatcher, MqttPublisher};
use crate::envelope::EnvelopeCipher;
use crate::storage::GatewayStore;
use crate::trends::TrendAnalyzer;

/// Shared handles for every request handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn GatewayStore>,
    pub cipher: Arc<EnvelopeCipher>,
    pub tokens: Arc<TokenIssuer>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub devices: DeviceRegistry,
    pub dispatcher: CommandDispatcher,
    pub notifier: AlarmNotifier,
    pub trends: TrendAnalyzer,
    pub login: LoginPolicy,
}

impl AppState {
    /// State with the default verifier, a disabled broker and no
    /// notification channel. Swap pieces in with the `with_*` methods.
    pub fn new(store: Arc<dyn GatewayStore>, cipher: EnvelopeCipher, tokens: TokenIssuer) -> Self {
        Self {
            trends: TrendAnalyzer::new(store.clone()),
            store,
            cipher: Arc::new(cipher),
            tokens: Arc::new(tokens),
            verifier: Arc::new(Argon2Verifier::new()),
            devices: DeviceRegistry::new(),
            dispatcher: CommandDispatcher::new(Arc::new(MqttPublisher::disabled())),
            notifier: AlarmNotifier::new(Arc::new(DisabledSink)),
            login: LoginPolicy::default(),
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: CommandDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_notifier(mut self, notifier: AlarmNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_login_policy(mut self, login: LoginPolicy) -> Self {
        self.login = login;
        self
    }
}
