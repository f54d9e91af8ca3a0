//! Database operations for `sync_status` and `sync_runs`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Outcome of one synchronizer stage, ready to be appended to `sync_runs`.
#[derive(Debug, Clone)]
pub struct NewSyncRun {
    /// `categories`, `products`, or `variants`.
    pub entity: String,
    /// What started the run: `startup`, `schedule`, or `cli`.
    pub trigger_source: String,
    /// `succeeded`, `partial`, or `aborted`.
    pub status: String,
    pub fetched: i32,
    pub upserted: i32,
    pub unchanged: i32,
    pub skipped: i32,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// A row from the `sync_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub entity: String,
    pub trigger_source: String,
    pub status: String,
    pub fetched: i32,
    pub upserted: i32,
    pub unchanged: i32,
    pub skipped: i32,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Sets the single `sync_status` row's `last_sync` to `NOW()`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn record_last_sync(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO sync_status (id, last_sync) VALUES (1, NOW()) \
         ON CONFLICT (id) DO UPDATE SET last_sync = EXCLUDED.last_sync",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns the last recorded full-sync timestamp, or `None` before the first run.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_last_sync(pool: &PgPool) -> Result<Option<DateTime<Utc>>, DbError> {
    let last_sync = sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT last_sync FROM sync_status WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?;
    Ok(last_sync)
}

/// Appends a stage outcome to `sync_runs` and returns its generated `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_sync_run(pool: &PgPool, run: &NewSyncRun) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO sync_runs \
             (public_id, entity, trigger_source, status, fetched, upserted, unchanged, \
              skipped, error_message, started_at, completed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(&run.entity)
    .bind(&run.trigger_source)
    .bind(&run.status)
    .bind(run.fetched)
    .bind(run.upserted)
    .bind(run.unchanged)
    .bind(run.skipped)
    .bind(&run.error_message)
    .bind(run.started_at)
    .bind(run.completed_at)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Lists the most recent stage outcomes, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_sync_runs(pool: &PgPool, limit: i64) -> Result<Vec<SyncRunRow>, DbError> {
    let rows = sqlx::query_as::<_, SyncRunRow>(
        "SELECT id, public_id, entity, trigger_source, status, fetched, upserted, \
                unchanged, skipped, error_message, started_at, completed_at \
         FROM sync_runs \
         ORDER BY started_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit.clamp(1, 500))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
