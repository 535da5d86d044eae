// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded gateway database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `credentials`: username → serialized Credential
//! - `doorlock_users`: access_id → serialized DoorlockUser
//! - `attendance`: auto-increment id → serialized AttendanceRecord
//! - `alarms`: auto-increment id → serialized AlarmRecord
//! - `door_open_logs`: auto-increment id → serialized DoorOpenLog

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, Table, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};

use super::records::{
    AccessCount, AlarmRecord, AttendanceRecord, Credential, DailyCount, DoorOpenLog,
    DoorOpenStats, DoorlockUser, NewAlarm, NewAttendance, NewDoorOpenLog,
};
use super::{GatewayStore, StoreError, StoreResult};

// =============================================================================
// Table Definitions
// =============================================================================

const CREDENTIALS: TableDefinition<&str, &[u8]> = TableDefinition::new("credentials");

const DOORLOCK_USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("doorlock_users");

const ATTENDANCE: TableDefinition<u64, &[u8]> = TableDefinition::new("attendance");

const ALARMS: TableDefinition<u64, &[u8]> = TableDefinition::new("alarms");

const DOOR_OPEN_LOGS: TableDefinition<u64, &[u8]> = TableDefinition::new("door_open_logs");

type KeyedTable = TableDefinition<'static, &'static str, &'static [u8]>;
type EventTable = TableDefinition<'static, u64, &'static [u8]>;

/// Next free key in an auto-increment table (ids start at 1).
fn next_id(table: &Table<'_, u64, &'static [u8]>) -> StoreResult<u64> {
    Ok(match table.last()? {
        Some((key, _)) => key.value() + 1,
        None => 1,
    })
}

// =============================================================================
// RedbStore
// =============================================================================

/// Embedded ACID store for identities and access-event history.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CREDENTIALS)?;
            let _ = write_txn.open_table(DOORLOCK_USERS)?;
            let _ = write_txn.open_table(ATTENDANCE)?;
            let _ = write_txn.open_table(ALARMS)?;
            let _ = write_txn.open_table(DOOR_OPEN_LOGS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn get_keyed<T: DeserializeOwned>(
        &self,
        def: KeyedTable,
        key: &str,
    ) -> StoreResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(def)?;
        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Insert under a unique key; an existing key is a conflict.
    fn insert_unique<T: Serialize>(
        &self,
        def: KeyedTable,
        key: &str,
        label: &str,
        value: &T,
    ) -> StoreResult<()> {
        let json = serde_json::to_vec(value)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(def)?;
            if table.get(key)?.is_some() {
                return Err(StoreError::Conflict(label.to_string()));
            }
            table.insert(key, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Append a row to an auto-increment table; `build` receives the new id.
    fn append<T: Serialize>(
        &self,
        def: EventTable,
        build: impl FnOnce(u64) -> T,
    ) -> StoreResult<T> {
        let write_txn = self.db.begin_write()?;
        let row = {
            let mut table = write_txn.open_table(def)?;
            let id = next_id(&table)?;
            let row = build(id);
            let json = serde_json::to_vec(&row)?;
            table.insert(id, json.as_slice())?;
            row
        };
        write_txn.commit()?;
        Ok(row)
    }

    /// All rows of an auto-increment table, newest (highest id) first.
    fn scan_newest_first<T: DeserializeOwned>(
        &self,
        def: EventTable,
    ) -> StoreResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(def)?;

        let mut rows = Vec::new();
        for entry in table.iter()?.rev() {
            let (_, value) = entry?;
            rows.push(serde_json::from_slice(value.value())?);
        }
        Ok(rows)
    }
}

impl GatewayStore for RedbStore {
    fn find_credential(&self, username: &str) -> StoreResult<Option<Credential>> {
        self.get_keyed(CREDENTIALS, username)
    }

    fn insert_credential(&self, credential: &Credential) -> StoreResult<()> {
        self.insert_unique(CREDENTIALS, &credential.username, "username", credential)
    }

    fn count_credentials(&self) -> StoreResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CREDENTIALS)?;
        let mut count = 0;
        for entry in table.iter()? {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    fn find_doorlock_user(&self, access_id: &str) -> StoreResult<Option<DoorlockUser>> {
        self.get_keyed(DOORLOCK_USERS, access_id)
    }

    fn insert_doorlock_user(&self, user: &DoorlockUser) -> StoreResult<()> {
        self.insert_unique(DOORLOCK_USERS, &user.access_id, "access_id", user)
    }

    fn insert_attendance(&self, new: NewAttendance) -> StoreResult<AttendanceRecord> {
        self.append(ATTENDANCE, |id| AttendanceRecord {
            id,
            username: new.username,
            access_id: new.access_id,
            status: new.status,
            arrow: new.arrow,
            created_at: new.created_at,
        })
    }

    fn list_attendance(&self) -> StoreResult<Vec<AttendanceRecord>> {
        self.scan_newest_first(ATTENDANCE)
    }

    fn insert_alarm(&self, new: NewAlarm) -> StoreResult<AlarmRecord> {
        self.append(ALARMS, |id| AlarmRecord {
            id,
            username: new.username,
            access_id: new.access_id,
            reason: new.reason,
            created_at: new.created_at,
        })
    }

    fn list_alarms(&self) -> StoreResult<Vec<AlarmRecord>> {
        self.scan_newest_first(ALARMS)
    }

    fn insert_door_open_log(&self, new: NewDoorOpenLog) -> StoreResult<DoorOpenLog> {
        self.append(DOOR_OPEN_LOGS, |id| DoorOpenLog {
            id,
            door_id: new.door_id,
            access_id: new.access_id,
            username: new.username,
            duration: new.duration,
            created_at: new.created_at,
        })
    }

    fn count_attendance_by_identity(&self, since: DateTime<Utc>) -> StoreResult<Vec<AccessCount>> {
        let mut groups: HashMap<(String, String), u64> = HashMap::new();
        for record in self.scan_newest_first::<AttendanceRecord>(ATTENDANCE)? {
            if record.created_at >= since {
                *groups.entry((record.access_id, record.username)).or_default() += 1;
            }
        }

        Ok(groups
            .into_iter()
            .map(|((access_id, username), access_count)| AccessCount {
                access_id,
                username,
                access_count,
            })
            .collect())
    }

    fn door_open_stats_above(&self, min_duration: i64) -> StoreResult<Vec<DoorOpenStats>> {
        let mut groups: HashMap<(String, String, String), (i128, u64)> = HashMap::new();
        for log in self.scan_newest_first::<DoorOpenLog>(DOOR_OPEN_LOGS)? {
            if log.duration > min_duration {
                let slot = groups
                    .entry((log.door_id, log.access_id, log.username))
                    .or_default();
                slot.0 += i128::from(log.duration);
                slot.1 += 1;
            }
        }

        Ok(groups
            .into_iter()
            .map(|((door_id, access_id, username), (total, count))| DoorOpenStats {
                door_id,
                access_id,
                username,
                avg_duration: total as f64 / count as f64,
                occurrence_count: count,
            })
            .collect())
    }

    fn daily_attendance(&self, since: DateTime<Utc>) -> StoreResult<Vec<DailyCount>> {
        let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for record in self.scan_newest_first::<AttendanceRecord>(ATTENDANCE)? {
            if record.created_at >= since {
                *days.entry(record.created_at.date_naive()).or_default() += 1;
            }
        }

        Ok(days
            .into_iter()
            .rev()
            .map(|(date, count)| DailyCount {
                date: date.format("%Y-%m-%d").to_string(),
                count,
            })
            .collect())
    }

    fn count_attendance_since(&self, since: Option<DateTime<Utc>>) -> StoreResult<u64> {
        let records = self.scan_newest_first::<AttendanceRecord>(ATTENDANCE)?;
        Ok(records
            .iter()
            .filter(|r| since.map_or(true, |s| r.created_at >= s))
            .count() as u64)
    }

    fn count_alarms_since(&self, since: Option<DateTime<Utc>>) -> StoreResult<u64> {
        let records = self.scan_newest_first::<AlarmRecord>(ALARMS)?;
        Ok(records
            .iter()
            .filter(|r| since.map_or(true, |s| r.created_at >= s))
            .count() as u64)
    }
}
