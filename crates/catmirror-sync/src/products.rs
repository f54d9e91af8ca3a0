use catmirror_core::{ProductRecord, SyncEntity, WarehouseRecord};
use catmirror_db::CatalogStore;
use catmirror_source::{SourceClient, SourceProduct, StockSubject};
use catmirror_storage::StorageClient;

use crate::assets::mirror_image;
use crate::pricing::extract_prices;
use crate::stock::extract_stock;
use crate::{parse_row, ReferenceData, SyncReport};

const ENDPOINT: &str = "entity/product";

/// Mirrors warehouses and then every product.
///
/// A failed stock request skips that product; a failed image mirror only
/// leaves `image_url` empty.
pub async fn sync_products<S: CatalogStore>(
    source: &SourceClient,
    storage: &StorageClient,
    store: &S,
    reference: &ReferenceData,
) -> SyncReport {
    let mut report = SyncReport::start(SyncEntity::Products);

    upsert_warehouses(store, reference).await;

    let rows = match source.fetch_collection(ENDPOINT, &[]).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "sync: product collection fetch failed; aborting");
            return report.abort(e);
        }
    };
    report.fetched = rows.len();
    tracing::info!(count = rows.len(), "sync: products fetched");

    for row in rows {
        let Some(product) = parse_row::<SourceProduct>(row, SyncEntity::Products) else {
            report.record_skip();
            continue;
        };

        let stock = match source
            .fetch_stock_report(StockSubject::Product, &product.id)
            .await
        {
            Ok(rows) => extract_stock(
                &product.id,
                &rows,
                StockSubject::Product,
                &reference.warehouses,
            ),
            Err(e) => {
                tracing::warn!(id = %product.id, name = %product.name, error = %e, "sync: product stock fetch failed; skipping");
                report.record_skip();
                continue;
            }
        };

        let image_url = mirror_image(source, storage, &product.id, product.images.as_ref()).await;

        let record = ProductRecord {
            prices: extract_prices(&product.sale_prices, &reference.price_tiers),
            category_id: product.product_folder.as_ref().and_then(|f| f.target_id()),
            id: product.id,
            name: product.name,
            description: product.description,
            image_url,
            stock,
        };

        match store.upsert_product(&record).await {
            Ok(changed) => report.record_write(changed),
            Err(e) => {
                tracing::error!(id = %record.id, name = %record.name, error = %e, "sync: product upsert failed");
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
        "sync: products complete"
    );
    report
}

async fn upsert_warehouses<S: CatalogStore>(store: &S, reference: &ReferenceData) {
    for (id, name) in &reference.warehouses {
        let warehouse = WarehouseRecord {
            id: id.clone(),
            name: name.clone(),
        };
        if let Err(e) = store.upsert_store(&warehouse).await {
            tracing::warn!(id = %id, name = %name, error = %e, "sync: warehouse upsert failed");
        }
    }
}
