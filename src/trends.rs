// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Trend Analyzer
//!
//! Read-only aggregations over the event history. Every call queries the
//! store afresh; nothing is cached between requests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::storage::{AccessCount, DoorOpenStats, GatewayStore, StoreResult};

/// Groups with more accesses than this are reported as frequent.
pub const FREQUENT_ACCESS_THRESHOLD: u64 = 5;

pub const DEFAULT_WINDOW_HOURS: i64 = 24;

pub const DEFAULT_OPEN_THRESHOLD_SECS: i64 = 60;

#[derive(Clone)]
pub struct TrendAnalyzer {
    store: Arc<dyn GatewayStore>,
}

impl TrendAnalyzer {
    pub fn new(store: Arc<dyn GatewayStore>) -> Self {
        Self { store }
    }

    /// Identities with more than [`FREQUENT_ACCESS_THRESHOLD`] attendance
    /// records in the trailing window.
    pub fn frequent_access(&self, window_hours: i64) -> StoreResult<Vec<AccessCount>> {
        self.frequent_access_at(window_hours, Utc::now())
    }

    pub fn frequent_access_at(&self, window_hours: i64, now: DateTime<Utc>) -> StoreResult<Vec<AccessCount>> {
        // A window reaching past the representable range covers all history.
        let since = Duration::try_hours(window_hours)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let groups = self.store.count_attendance_by_identity(since)?;
        Ok(groups
            .into_iter()
            .filter(|group| group.access_count > FREQUENT_ACCESS_THRESHOLD)
            .collect())
    }

    /// Door-open statistics for openings longer than `threshold_secs`.
    pub fn long_open_doors(&self, threshold_secs: i64) -> StoreResult<Vec<DoorOpenStats>> {
        self.store.door_open_stats_above(threshold_secs)
    }
}

impl std::fmt::Debug for TrendAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrendAnalyzer").finish_non_exhaustive()
    }
}
