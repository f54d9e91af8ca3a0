use catmirror_core::{SyncEntity, VariantRecord};
use catmirror_db::CatalogStore;
use catmirror_source::{SourceClient, SourceVariant, StockSubject};
use catmirror_storage::StorageClient;

use crate::assets::mirror_image;
use crate::pricing::extract_prices;
use crate::stock::extract_stock;
use crate::{parse_row, ReferenceData, SyncReport};

const ENDPOINT: &str = "entity/variant";

/// Mirrors every variant whose parent product is already in the store.
///
/// The parent check runs before any further request for the variant, so a
/// variant of an unknown product costs no stock, image, or write calls.
pub async fn sync_variants<S: CatalogStore>(
    source: &SourceClient,
    storage: &StorageClient,
    store: &S,
    reference: &ReferenceData,
) -> SyncReport {
    let mut report = SyncReport::start(SyncEntity::Variants);

    let rows = match source.fetch_collection(ENDPOINT, &[]).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "sync: variant collection fetch failed; aborting");
            return report.abort(e);
        }
    };
    report.fetched = rows.len();
    tracing::info!(count = rows.len(), "sync: variants fetched");

    for row in rows {
        let Some(variant) = parse_row::<SourceVariant>(row, SyncEntity::Variants) else {
            report.record_skip();
            continue;
        };

        let Some(product_id) = variant.product.target_id() else {
            tracing::warn!(id = %variant.id, name = %variant.name, "sync: variant has no resolvable product; skipping");
            report.record_skip();
            continue;
        };

        match store.product_exists(&product_id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    id = %variant.id,
                    name = %variant.name,
                    product_id = %product_id,
                    "sync: variant references product missing from the mirror; skipping"
                );
                report.record_skip();
                continue;
            }
            Err(e) => {
                tracing::error!(id = %variant.id, error = %e, "sync: product lookup failed; skipping variant");
                report.record_skip();
                continue;
            }
        }

        let stock = match source
            .fetch_stock_report(StockSubject::Variant, &variant.id)
            .await
        {
            Ok(rows) => extract_stock(
                &variant.id,
                &rows,
                StockSubject::Variant,
                &reference.warehouses,
            ),
            Err(e) => {
                tracing::warn!(id = %variant.id, name = %variant.name, error = %e, "sync: variant stock fetch failed; skipping");
                report.record_skip();
                continue;
            }
        };

        let image_url = mirror_image(source, storage, &variant.id, variant.images.as_ref()).await;

        let record = VariantRecord {
            prices: extract_prices(&variant.sale_prices, &reference.price_tiers),
            id: variant.id,
            product_id,
            name: variant.name,
            characteristics: variant.characteristics,
            image_url,
            stock,
        };

        match store.upsert_variant(&record).await {
            Ok(changed) => report.record_write(changed),
            Err(e) => {
                tracing::error!(id = %record.id, name = %record.name, error = %e, "sync: variant upsert failed");
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
        "sync: variants complete"
    );
    report
}
