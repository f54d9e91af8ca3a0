//! Live integration tests for catmirror-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. They need `DATABASE_URL` pointing at a Postgres server
//! and are ignored by default:
//! `cargo test -p catmirror-db --test live -- --ignored`

use catmirror_core::{CategoryRecord, PriceMap, ProductRecord, StockMap, VariantRecord};
use catmirror_db::{
    get_category, get_last_sync, get_product, get_variant, insert_sync_run, list_recent_sync_runs,
    product_exists, record_last_sync, upsert_category, upsert_product, upsert_variant, NewSyncRun,
};
use rust_decimal::Decimal;

fn make_product(id: &str) -> ProductRecord {
    let mut prices = PriceMap::new();
    prices.insert("Retail".to_string(), Decimal::new(15_000, 2));
    let mut stock = StockMap::new();
    stock.insert("Main".to_string(), 3.0);

    ProductRecord {
        id: id.to_string(),
        name: "Green Tea".to_string(),
        description: Some("Loose leaf".to_string()),
        image_url: None,
        category_id: None,
        prices,
        stock,
    }
}

fn make_variant(id: &str, product_id: &str) -> VariantRecord {
    VariantRecord {
        id: id.to_string(),
        product_id: product_id.to_string(),
        name: "Green Tea (250g)".to_string(),
        characteristics: Some(serde_json::json!([{ "name": "Weight", "value": "250g" }])),
        image_url: None,
        prices: PriceMap::new(),
        stock: StockMap::new(),
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn category_upsert_is_idempotent(pool: sqlx::PgPool) {
    let category = CategoryRecord {
        id: "folder-1".to_string(),
        name: "Tea".to_string(),
        parent_id: None,
    };

    assert!(upsert_category(&pool, &category).await.expect("insert"));
    assert!(
        !upsert_category(&pool, &category).await.expect("replay"),
        "replaying an unchanged category must not write"
    );

    let renamed = CategoryRecord {
        name: "Teas".to_string(),
        ..category
    };
    assert!(upsert_category(&pool, &renamed).await.expect("update"));

    let row = get_category(&pool, "folder-1")
        .await
        .expect("get_category")
        .expect("row exists");
    assert_eq!(row.name, "Teas");
    assert!(row.parent_id.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn product_upsert_stores_prices_as_numbers(pool: sqlx::PgPool) {
    let product = make_product("p-1");
    assert!(upsert_product(&pool, &product).await.expect("insert"));
    assert!(!upsert_product(&pool, &product).await.expect("replay"));

    let row = get_product(&pool, "p-1")
        .await
        .expect("get_product")
        .expect("row exists");
    assert_eq!(row.prices, serde_json::json!({ "Retail": 150.0 }));
    assert_eq!(row.stock, serde_json::json!({ "Main": 3.0 }));
    assert!(product_exists(&pool, "p-1").await.expect("exists"));
    assert!(!product_exists(&pool, "p-404").await.expect("exists"));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn variant_requires_existing_product(pool: sqlx::PgPool) {
    let orphan = make_variant("v-1", "missing-product");
    let err = upsert_variant(&pool, &orphan).await;
    assert!(err.is_err(), "foreign key must reject a dangling product_id");

    upsert_product(&pool, &make_product("p-1"))
        .await
        .expect("insert product");
    let variant = make_variant("v-1", "p-1");
    assert!(upsert_variant(&pool, &variant).await.expect("insert variant"));

    let row = get_variant(&pool, "v-1")
        .await
        .expect("get_variant")
        .expect("row exists");
    assert_eq!(row.product_id, "p-1");
    assert_eq!(
        row.characteristics,
        Some(serde_json::json!([{ "name": "Weight", "value": "250g" }]))
    );
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn sync_status_and_runs_round_trip(pool: sqlx::PgPool) {
    assert!(get_last_sync(&pool).await.expect("get").is_none());
    record_last_sync(&pool).await.expect("first record");
    record_last_sync(&pool).await.expect("second record");
    assert!(get_last_sync(&pool).await.expect("get").is_some());

    let now = chrono::Utc::now();
    insert_sync_run(
        &pool,
        &NewSyncRun {
            entity: "categories".to_string(),
            trigger_source: "cli".to_string(),
            status: "succeeded".to_string(),
            fetched: 3,
            upserted: 3,
            unchanged: 0,
            skipped: 0,
            error_message: None,
            started_at: now,
            completed_at: now,
        },
    )
    .await
    .expect("insert_sync_run");

    let runs = list_recent_sync_runs(&pool, 10).await.expect("list");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].entity, "categories");
    assert_eq!(runs[0].upserted, 3);
}
