use catmirror_db::SyncRunRow;
use sqlx::PgPool;

pub(crate) async fn run_status(pool: &PgPool, limit: i64) -> anyhow::Result<()> {
    match catmirror_db::get_last_sync(pool).await? {
        Some(at) => println!("last full sync: {}", at.to_rfc3339()),
        None => println!("last full sync: never"),
    }

    let runs = catmirror_db::list_recent_sync_runs(pool, limit).await?;
    if runs.is_empty() {
        println!("no sync runs recorded");
        return Ok(());
    }
    for run in &runs {
        println!("{}", format_run(run));
    }
    Ok(())
}

pub(crate) fn format_run(run: &SyncRunRow) -> String {
    let mut line = format!(
        "{} {:<10} {:<9} {:<8} fetched={} upserted={} unchanged={} skipped={}",
        run.started_at.format("%Y-%m-%d %H:%M:%S"),
        run.entity,
        run.status,
        run.trigger_source,
        run.fetched,
        run.upserted,
        run.unchanged,
        run.skipped
    );
    if let Some(error) = &run.error_message {
        line.push_str(" error: ");
        line.push_str(error);
    }
    line
}
