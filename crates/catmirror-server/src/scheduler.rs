//! Background sync scheduler.
//!
//! Registers a one-shot full sync shortly after startup and one repeating job
//! per entity. Every job runs on the server's tokio runtime and owns a
//! [`JobGuard`] so a run that overruns its interval is never overlapped.

use std::sync::Arc;
use std::time::Duration;

use catmirror_core::{AppConfig, SyncEntity};
use catmirror_sync::{JobGuard, SyncReport, SyncTrigger, Syncer};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the scheduler.
///
/// The returned handle must be kept alive for the lifetime of the process;
/// dropping it stops all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, a
/// job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_startup_sync(&scheduler, pool.clone(), Arc::clone(&config)).await?;
    for entity in SyncEntity::ALL {
        register_entity_job(&scheduler, pool.clone(), Arc::clone(&config), entity).await?;
    }

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_startup_sync(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let delay = Duration::from_secs(config.sync_startup_delay_secs);
    let guard = JobGuard::new("full_sync");

    let job = Job::new_one_shot_async(delay, move |_uuid, _lock| {
        let pool = pool.clone();
        let config = Arc::clone(&config);
        let guard = guard.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting startup full sync");
            if guard.run(run_full_sync_job(pool, config)).await.is_some() {
                tracing::info!("scheduler: startup full sync complete");
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(
        delay_secs = delay.as_secs(),
        "scheduler: registered startup full sync"
    );
    Ok(())
}

async fn register_entity_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<AppConfig>,
    entity: SyncEntity,
) -> Result<(), JobSchedulerError> {
    let interval = Duration::from_secs(config.sync_interval_secs);
    let guard = JobGuard::new(entity.as_str());

    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let pool = pool.clone();
        let config = Arc::clone(&config);
        let guard = guard.clone();

        Box::pin(async move {
            guard.run(run_entity_job(pool, config, entity)).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(
        entity = %entity,
        interval_secs = interval.as_secs(),
        "scheduler: registered recurring entity sync"
    );
    Ok(())
}

async fn run_full_sync_job(pool: PgPool, config: Arc<AppConfig>) {
    let syncer = match Syncer::from_config(&config, pool) {
        Ok(syncer) => syncer,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: sync is not configured; skipping full sync");
            return;
        }
    };

    let report = syncer.run_full_sync(SyncTrigger::Startup).await;
    for stage in &report.stages {
        log_stage(stage);
    }
}

async fn run_entity_job(pool: PgPool, config: Arc<AppConfig>, entity: SyncEntity) {
    let syncer = match Syncer::from_config(&config, pool) {
        Ok(syncer) => syncer,
        Err(e) => {
            tracing::error!(entity = %entity, error = %e, "scheduler: sync is not configured; skipping run");
            return;
        }
    };

    let report = syncer.run_entity(entity, SyncTrigger::Schedule).await;
    log_stage(&report);
}

fn log_stage(report: &SyncReport) {
    tracing::info!(
        entity = %report.entity,
        status = %report.status,
        fetched = report.fetched,
        upserted = report.upserted,
        unchanged = report.unchanged,
        skipped = report.skipped,
        error = report.error.as_deref().unwrap_or(""),
        "scheduler: sync stage finished"
    );
}
