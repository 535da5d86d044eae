// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use doorlock_gateway::{
    alarms::{AlarmNotifier, DisabledSink, NotificationSink, TelegramSink},
    api::{cors_layer, router},
    auth::{Argon2Verifier, TokenIssuer},
    config::GatewayConfig,
    dispatch::{mqtt::BrokerSettings, CommandDispatcher, MqttPublisher},
    envelope::EnvelopeCipher,
    state::AppState,
    storage::{seed_store, RedbStore},
    telemetry::init_tracing,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Must run before any TLS configuration is built.
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        eprintln!("rustls crypto provider was already installed");
    }

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(config.log_format);
    info!(?config, "starting doorlock gateway");

    let store = Arc::new(RedbStore::open(&config.database_path)?);
    let verifier = Argon2Verifier::new();
    seed_store(store.as_ref(), &verifier, &config.seed)?;

    let cipher = EnvelopeCipher::new(&config.envelope_key)?;
    let tokens = TokenIssuer::new(&config.jwt_secret).with_ttl(config.token_ttl);

    let shutdown = CancellationToken::new();
    let publisher = MqttPublisher::connect(
        &BrokerSettings::new(config.mqtt_broker_url.clone(), config.mqtt_client_id.clone()),
        shutdown.clone(),
    )
    .await;

    let sink: Arc<dyn NotificationSink> = match &config.telegram {
        Some(telegram) => match TelegramSink::new(&telegram.api_base, &telegram.bot_token, &telegram.chat_id) {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                warn!(error = %e, "telegram notifications disabled");
                Arc::new(DisabledSink)
            }
        },
        None => {
            warn!("TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID not set, alarm notifications disabled");
            Arc::new(DisabledSink)
        }
    };

    let state = AppState::new(store, cipher, tokens)
        .with_verifier(Arc::new(verifier))
        .with_dispatcher(CommandDispatcher::new(Arc::new(publisher)))
        .with_notifier(AlarmNotifier::new(sink))
        .with_login_policy(config.login.clone());
    let app = router(state).layer(cors_layer(&config.cors_origin));

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone(), shutdown.clone()));

    let addr = config.bind_addr;
    match &config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            info!(%addr, "listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!(%addr, "listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    shutdown.cancel();
    info!("doorlock gateway stopped");
    Ok(())
}

async fn shutdown_signal(handle: Handle<std::net::SocketAddr>, shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown requested");
    shutdown.cancel();
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
