//! `catmirror-cli sync`: one-shot foreground runs.

use catmirror_core::AppConfig;
use catmirror_sync::{SyncReport, SyncStatus, SyncTrigger, Syncer};
use sqlx::PgPool;

use crate::EntityFilter;

/// Runs the requested sync and prints one line per stage.
///
/// # Errors
///
/// Fails when sync is not configured or when any stage aborted, so a caller
/// such as cron sees a non-zero exit.
pub(crate) async fn run_sync(
    pool: PgPool,
    config: &AppConfig,
    filter: EntityFilter,
) -> anyhow::Result<()> {
    let syncer = Syncer::from_config(config, pool)
        .map_err(|e| anyhow::anyhow!("sync is not configured: {e}"))?;

    let stages = match filter {
        EntityFilter::All => syncer.run_full_sync(SyncTrigger::Cli).await.stages,
        EntityFilter::One(entity) => vec![syncer.run_entity(entity, SyncTrigger::Cli).await],
    };

    for stage in &stages {
        println!("{}", format_stage(stage));
    }

    let aborted = stages
        .iter()
        .filter(|s| s.status == SyncStatus::Aborted)
        .count();
    if aborted > 0 {
        anyhow::bail!("{aborted} sync stage(s) aborted");
    }
    Ok(())
}

pub(crate) fn format_stage(stage: &SyncReport) -> String {
    let mut line = format!(
        "{:<10} {:<9} fetched={} upserted={} unchanged={} skipped={} ({} ms)",
        stage.entity.as_str(),
        stage.status.as_str(),
        stage.fetched,
        stage.upserted,
        stage.unchanged,
        stage.skipped,
        (stage.finished_at - stage.started_at).num_milliseconds()
    );
    if let Some(error) = &stage.error {
        line.push_str(" error: ");
        line.push_str(error);
    }
    line
}
