// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8090` |
//! | `DATABASE_PATH` | redb database file | `./data/gateway.redb` |
//! | `ENVELOPE_KEY` | AEAD key for sealed bodies, 16 or 32 bytes | Required |
//! | `JWT_SECRET` | Session token signing secret | Required |
//! | `TOKEN_TTL_HOURS` | Session lifetime in hours | `24` |
//! | `MQTT_BROKER_URL` | Command broker | `tcp://localhost:1883` |
//! | `MQTT_CLIENT_ID` | Broker client id | `doorlock_backend` |
//! | `TELEGRAM_BOT_TOKEN` | Alarm notification bot | Optional |
//! | `TELEGRAM_CHAT_ID` | Alarm notification chat | Optional |
//! | `TELEGRAM_API_BASE` | Bot API base URL | `https://api.telegram.org` |
//! | `CORS_ALLOWED_ORIGIN` | Dashboard origin | `http://localhost:5173` |
//! | `SEAL_LOGIN_ERRORS` | Seal login failure bodies too | `false` |
//! | `ALLOW_PLAIN_LOGIN` | Mount `/api/login/plain` | `false` |
//! | `SEED_ADMIN_USERNAME` | First-run operator | Optional |
//! | `SEED_ADMIN_PASSWORD` | First-run operator password | Optional |
//! | `SEED_DEMO_DATA` | Create demo doorlock users | `false` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | Serve HTTPS (PEM files) | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;

use crate::alarms::telegram::DEFAULT_TELEGRAM_API_BASE;
use crate::storage::SeedOptions;

pub const DEFAULT_PORT: u16 = 8090;
pub const DEFAULT_DATABASE_PATH: &str = "./data/gateway.redb";
pub const DEFAULT_MQTT_BROKER_URL: &str = "tcp://localhost:1883";
pub const DEFAULT_MQTT_CLIENT_ID: &str = "doorlock_backend";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginPolicy {
    /// Seal the invalid-credentials body in an envelope.
    pub seal_errors: bool,
    /// Mount the legacy unsealed login route.
    pub allow_plain: bool,
}

#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub api_base: String,
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub envelope_key: Vec<u8>,
    pub jwt_secret: Vec<u8>,
    pub token_ttl: Duration,
    pub mqtt_broker_url: String,
    pub mqtt_client_id: String,
    pub telegram: Option<TelegramSettings>,
    pub cors_origin: String,
    pub login: LoginPolicy,
    pub seed: SeedOptions,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_path", &self.database_path)
            .field("token_ttl", &self.token_ttl)
            .field("mqtt_broker_url", &self.mqtt_broker_url)
            .field("telegram", &self.telegram.is_some())
            .field("login", &self.login)
            .field("tls", &self.tls.is_some())
            .finish_non_exhaustive()
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or_default = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let host = or_default("HOST", "0.0.0.0");
        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "HOST",
                reason: e.to_string(),
            })?;

        let envelope_key = get("ENVELOPE_KEY").ok_or(ConfigError::Missing("ENVELOPE_KEY"))?.into_bytes();
        if !matches!(envelope_key.len(), 16 | 32) {
            return Err(ConfigError::Invalid {
                name: "ENVELOPE_KEY",
                reason: format!("expected 16 or 32 bytes, got {}", envelope_key.len()),
            });
        }

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?.into_bytes();

        let token_ttl = match get("TOKEN_TTL_HOURS") {
            Some(raw) => match raw
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .and_then(Duration::try_hours)
            {
                Some(ttl) => ttl,
                None => {
                    return Err(ConfigError::Invalid {
                        name: "TOKEN_TTL_HOURS",
                        reason: format!("expected a positive number of hours, got {raw:?}"),
                    })
                }
            },
            None => Duration::hours(crate::auth::token::DEFAULT_TOKEN_TTL_HOURS),
        };

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramSettings {
                api_base: or_default("TELEGRAM_API_BASE", DEFAULT_TELEGRAM_API_BASE),
                bot_token,
                chat_id,
            }),
            _ => None,
        };

        let tls = match (get("TLS_CERT_PATH"), get("TLS_KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    name: "TLS_CERT_PATH",
                    reason: "TLS_CERT_PATH and TLS_KEY_PATH must be set together".to_string(),
                })
            }
        };

        let log_format = match or_default("LOG_FORMAT", "pretty").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            bind_addr,
            database_path: or_default("DATABASE_PATH", DEFAULT_DATABASE_PATH).into(),
            envelope_key,
            jwt_secret,
            token_ttl,
            mqtt_broker_url: or_default("MQTT_BROKER_URL", DEFAULT_MQTT_BROKER_URL),
            mqtt_client_id: or_default("MQTT_CLIENT_ID", DEFAULT_MQTT_CLIENT_ID),
            telegram,
            cors_origin: or_default("CORS_ALLOWED_ORIGIN", DEFAULT_CORS_ORIGIN),
            login: LoginPolicy {
                seal_errors: parse_flag(get("SEAL_LOGIN_ERRORS")),
                allow_plain: parse_flag(get("ALLOW_PLAIN_LOGIN")),
            },
            seed: SeedOptions {
                admin_username: get("SEED_ADMIN_USERNAME"),
                admin_password: get("SEED_ADMIN_PASSWORD"),
                demo_data: parse_flag(get("SEED_DEMO_DATA")),
            },
            tls,
            log_format,
        })
    }
}

fn parse_flag(raw: Option<String>) -> bool {
    matches!(
        raw.as_deref().map(str::to_lowercase).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}
