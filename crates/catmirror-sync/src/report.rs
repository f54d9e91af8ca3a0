//! Per-stage and per-pass outcome reporting.

use catmirror_core::SyncEntity;
use catmirror_db::NewSyncRun;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What started a sync run. Persisted as `sync_runs.trigger_source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    Startup,
    Schedule,
    Cli,
}

impl SyncTrigger {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SyncTrigger::Startup => "startup",
            SyncTrigger::Schedule => "schedule",
            SyncTrigger::Cli => "cli",
        }
    }
}

impl std::fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Every fetched record was written or found unchanged.
    Succeeded,
    /// The collection was processed but some records were skipped.
    Partial,
    /// The stage stopped before processing records.
    Aborted,
}

impl SyncStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Succeeded => "succeeded",
            SyncStatus::Partial => "partial",
            SyncStatus::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one synchronizer stage.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub entity: SyncEntity,
    pub status: SyncStatus,
    /// Records returned by the collection fetch.
    pub fetched: usize,
    /// Records whose destination row was inserted or changed.
    pub upserted: usize,
    /// Records whose destination row already matched.
    pub unchanged: usize,
    /// Records skipped by per-record or reference-integrity failures.
    pub skipped: usize,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub(crate) fn start(entity: SyncEntity) -> Self {
        let now = Utc::now();
        Self {
            entity,
            status: SyncStatus::Succeeded,
            fetched: 0,
            upserted: 0,
            unchanged: 0,
            skipped: 0,
            error: None,
            started_at: now,
            finished_at: now,
        }
    }

    /// A stage that never got to run, e.g. because reference data was missing.
    pub(crate) fn aborted(entity: SyncEntity, error: impl std::fmt::Display) -> Self {
        Self::start(entity).abort(error)
    }

    pub(crate) fn record_write(&mut self, changed: bool) {
        if changed {
            self.upserted += 1;
        } else {
            self.unchanged += 1;
        }
    }

    pub(crate) fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub(crate) fn abort(mut self, error: impl std::fmt::Display) -> Self {
        self.status = SyncStatus::Aborted;
        self.error = Some(error.to_string());
        self.finished_at = Utc::now();
        self
    }

    pub(crate) fn finish(mut self) -> Self {
        if self.status != SyncStatus::Aborted && self.skipped > 0 {
            self.status = SyncStatus::Partial;
        }
        self.finished_at = Utc::now();
        self
    }

    /// The `sync_runs` row describing this stage.
    #[must_use]
    pub fn to_new_run(&self, trigger: SyncTrigger) -> NewSyncRun {
        NewSyncRun {
            entity: self.entity.as_str().to_owned(),
            trigger_source: trigger.as_str().to_owned(),
            status: self.status.as_str().to_owned(),
            fetched: count_i32(self.fetched),
            upserted: count_i32(self.upserted),
            unchanged: count_i32(self.unchanged),
            skipped: count_i32(self.skipped),
            error_message: self.error.clone(),
            started_at: self.started_at,
            completed_at: self.finished_at,
        }
    }
}

fn count_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Outcome of one full pass over every entity.
#[derive(Debug, Clone, Serialize)]
pub struct FullSyncReport {
    pub trigger: SyncTrigger,
    pub stages: Vec<SyncReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl FullSyncReport {
    #[must_use]
    pub fn stage(&self, entity: SyncEntity) -> Option<&SyncReport> {
        self.stages.iter().find(|s| s.entity == entity)
    }

    /// True when every stage succeeded without skips.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.stages
            .iter()
            .all(|s| s.status == SyncStatus::Succeeded)
    }
}
