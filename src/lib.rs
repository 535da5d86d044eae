// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Doorlock Gateway - Access-Control Gateway Service
//!
//! Sits between field devices (door controllers, card/PIN readers, buzzers)
//! and the administrative frontend.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Operator login and session tokens
//! - `envelope` - Sealed request/response bodies
//! - `devices` - In-memory device status registry
//! - `dispatch` - Device commands over MQTT
//! - `alarms` - Alarm classification and notification
//! - `trends` - Access and door-open analysis
//! - `storage` - Embedded database (redb)

pub mod alarms;
pub mod api;
pub mod auth;
pub mod config;
pub mod devices;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod trends;

#[cfg(test)]
pub(crate) mod test_support;
