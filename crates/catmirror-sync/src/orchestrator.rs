//! Runs the synchronizers in dependency order and records their outcomes.

use std::time::Duration;

use catmirror_core::{AppConfig, SyncEntity};
use catmirror_db::CatalogStore;
use catmirror_source::{SourceClient, SourceConfig};
use catmirror_storage::{StorageClient, StorageConfig};
use chrono::Utc;

use crate::categories::sync_categories;
use crate::products::sync_products;
use crate::variants::sync_variants;
use crate::{FullSyncReport, ReferenceData, SyncError, SyncReport, SyncTrigger};

/// Owns the clients and destination store used by one job.
pub struct Syncer<S> {
    source: SourceClient,
    storage: StorageClient,
    store: S,
    stage_pause: Duration,
}

impl<S: CatalogStore> Syncer<S> {
    #[must_use]
    pub fn new(source: SourceClient, storage: StorageClient, store: S, stage_pause: Duration) -> Self {
        Self {
            source,
            storage,
            store,
            stage_pause,
        }
    }

    /// Builds both HTTP clients from configuration. Nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Source`] when the source token is missing or
    /// invalid, or [`SyncError::Storage`] when the storage key is unusable.
    pub fn from_config(config: &AppConfig, store: S) -> Result<Self, SyncError> {
        let source = SourceClient::new(&SourceConfig::from_app_config(config))?;
        let storage = StorageClient::new(&StorageConfig::from_app_config(config))?;
        Ok(Self::new(
            source,
            storage,
            store,
            Duration::from_millis(config.sync_stage_pause_ms),
        ))
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Categories, then products, then variants, with reference data fetched
    /// once and shared by the last two stages.
    ///
    /// Every stage is attempted even if an earlier one failed. The last-sync
    /// timestamp is written at the end whatever the outcome.
    pub async fn run_full_sync(&self, trigger: SyncTrigger) -> FullSyncReport {
        let started_at = Utc::now();
        tracing::info!(trigger = %trigger, "sync: full sync starting");

        let reference = match ReferenceData::fetch(&self.source).await {
            Ok(reference) => Ok(reference),
            Err(e) => {
                tracing::error!(error = %e, "sync: reference data fetch failed; product and variant stages will abort");
                Err(format!("reference data unavailable: {e}"))
            }
        };

        let mut stages = Vec::with_capacity(SyncEntity::ALL.len());
        for (i, entity) in SyncEntity::ALL.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.stage_pause).await;
            }
            let report = match (&reference, entity) {
                (_, SyncEntity::Categories) => sync_categories(&self.source, &self.store).await,
                (Ok(reference), entity) => self.run_stage(entity, reference).await,
                (Err(reason), entity) => SyncReport::aborted(entity, reason),
            };
            self.record(&report, trigger).await;
            stages.push(report);
        }

        if let Err(e) = self.store.record_last_sync().await {
            tracing::error!(error = %e, "sync: failed to record last sync timestamp");
        }

        let report = FullSyncReport {
            trigger,
            stages,
            started_at,
            finished_at: Utc::now(),
        };
        tracing::info!(
            trigger = %trigger,
            clean = report.is_clean(),
            elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "sync: full sync complete"
        );
        report
    }

    /// Runs a single entity's synchronizer, fetching its own reference data
    /// when needed.
    pub async fn run_entity(&self, entity: SyncEntity, trigger: SyncTrigger) -> SyncReport {
        tracing::info!(entity = %entity, trigger = %trigger, "sync: entity sync starting");
        let report = match entity {
            SyncEntity::Categories => sync_categories(&self.source, &self.store).await,
            SyncEntity::Products | SyncEntity::Variants => {
                match ReferenceData::fetch(&self.source).await {
                    Ok(reference) => self.run_stage(entity, &reference).await,
                    Err(e) => {
                        tracing::error!(entity = %entity, error = %e, "sync: reference data fetch failed; aborting");
                        SyncReport::aborted(entity, format!("reference data unavailable: {e}"))
                    }
                }
            }
        };
        self.record(&report, trigger).await;
        report
    }

    async fn run_stage(&self, entity: SyncEntity, reference: &ReferenceData) -> SyncReport {
        match entity {
            SyncEntity::Categories => sync_categories(&self.source, &self.store).await,
            SyncEntity::Products => {
                sync_products(&self.source, &self.storage, &self.store, reference).await
            }
            SyncEntity::Variants => {
                sync_variants(&self.source, &self.storage, &self.store, reference).await
            }
        }
    }

    async fn record(&self, report: &SyncReport, trigger: SyncTrigger) {
        if let Err(e) = self.store.record_sync_run(&report.to_new_run(trigger)).await {
            tracing::warn!(entity = %report.entity, error = %e, "sync: failed to record sync run");
        }
    }
}
