use catmirror_core::{CategoryRecord, SyncEntity};
use catmirror_db::CatalogStore;
use catmirror_source::{SourceClient, SourceFolder};

use crate::{parse_row, SyncReport};

const ENDPOINT: &str = "entity/productfolder";

/// Mirrors every product folder into `categories`.
///
/// Parents are stored as plain ids, so folders can be written in any order.
pub async fn sync_categories<S: CatalogStore>(source: &SourceClient, store: &S) -> SyncReport {
    let mut report = SyncReport::start(SyncEntity::Categories);

    let rows = match source.fetch_collection(ENDPOINT, &[]).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "sync: category collection fetch failed; aborting");
            return report.abort(e);
        }
    };
    report.fetched = rows.len();
    tracing::info!(count = rows.len(), "sync: categories fetched");

    for row in rows {
        let Some(folder) = parse_row::<SourceFolder>(row, SyncEntity::Categories) else {
            report.record_skip();
            continue;
        };

        let category = CategoryRecord {
            parent_id: folder.product_folder.as_ref().and_then(|p| p.target_id()),
            id: folder.id,
            name: folder.name,
        };

        match store.upsert_category(&category).await {
            Ok(changed) => report.record_write(changed),
            Err(e) => {
                tracing::error!(id = %category.id, name = %category.name, error = %e, "sync: category upsert failed");
                report.record_skip();
            }
        }
    }

    let report = report.finish();
    tracing::info!(
        status = %report.status,
        upserted = report.upserted,
        unchanged = report.unchanged,
        skipped = report.skipped,
        "sync: categories complete"
    );
    report
}
