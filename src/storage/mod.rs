// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Gateway Storage
//!
//! Identity tables (operator credentials, doorlock users) and append-only
//! event history (attendance, alarms, door-open logs).
//!
//! Handlers and services depend on the [`GatewayStore`] trait; the
//! production implementation is [`RedbStore`], an embedded redb database.
//!
//! ## Storage Layout
//!
//! ```text
//! ./data/gateway.redb
//!   credentials      username  -> Credential
//!   doorlock_users   access_id -> DoorlockUser
//!   attendance       id        -> AttendanceRecord
//!   alarms           id        -> AlarmRecord
//!   door_open_logs   id        -> DoorOpenLog
//! ```

pub mod database;
pub mod records;
pub mod seed;

use chrono::{DateTime, Utc};

pub use database::RedbStore;
pub use records::{
    AccessCount, AlarmRecord, Arrow, AttendanceRecord, Credential, DailyCount, DoorOpenLog,
    DoorOpenStats, DoorlockUser, NewAlarm, NewAttendance, NewDoorOpenLog,
};
pub use seed::{seed_store, SeedOptions};

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("seed error: {0}")]
    Seed(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Store Trait
// =============================================================================

/// Persistence operations used by the gateway.
///
/// Lists are returned newest first. Aggregates carry no ordering guarantee
/// unless stated; callers sort for presentation.
pub trait GatewayStore: Send + Sync {
    fn find_credential(&self, username: &str) -> StoreResult<Option<Credential>>;

    /// Fails with [`StoreError::Conflict`] if the username is taken.
    fn insert_credential(&self, credential: &Credential) -> StoreResult<()>;

    fn count_credentials(&self) -> StoreResult<u64>;

    fn find_doorlock_user(&self, access_id: &str) -> StoreResult<Option<DoorlockUser>>;

    /// Fails with [`StoreError::Conflict`] if the access id is taken.
    fn insert_doorlock_user(&self, user: &DoorlockUser) -> StoreResult<()>;

    fn insert_attendance(&self, new: NewAttendance) -> StoreResult<AttendanceRecord>;

    fn list_attendance(&self) -> StoreResult<Vec<AttendanceRecord>>;

    fn insert_alarm(&self, new: NewAlarm) -> StoreResult<AlarmRecord>;

    fn list_alarms(&self) -> StoreResult<Vec<AlarmRecord>>;

    fn insert_door_open_log(&self, new: NewDoorOpenLog) -> StoreResult<DoorOpenLog>;

    /// Attendance rows with `created_at >= since`, grouped by identity.
    fn count_attendance_by_identity(&self, since: DateTime<Utc>) -> StoreResult<Vec<AccessCount>>;

    /// Door-open logs with `duration > min_duration`, grouped by
    /// `(door_id, access_id, username)`.
    fn door_open_stats_above(&self, min_duration: i64) -> StoreResult<Vec<DoorOpenStats>>;

    /// Attendance per UTC day since `since`, most recent day first.
    fn daily_attendance(&self, since: DateTime<Utc>) -> StoreResult<Vec<DailyCount>>;

    fn count_attendance_since(&self, since: Option<DateTime<Utc>>) -> StoreResult<u64>;

    fn count_alarms_since(&self, since: Option<DateTime<Utc>>) -> StoreResult<u64>;
}
