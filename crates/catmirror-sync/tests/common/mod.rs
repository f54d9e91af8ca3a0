#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use catmirror_core::{CategoryRecord, ProductRecord, VariantRecord, WarehouseRecord};
use catmirror_db::{CatalogStore, DbError, NewSyncRun};
use catmirror_source::{SourceClient, SourceConfig};
use catmirror_storage::{StorageClient, StorageConfig};
use catmirror_sync::Syncer;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Write-tracking in-memory stand-in for the Postgres store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default, Clone)]
pub struct State {
    pub categories: BTreeMap<String, CategoryRecord>,
    pub stores: BTreeMap<String, WarehouseRecord>,
    pub products: BTreeMap<String, ProductRecord>,
    pub variants: BTreeMap<String, VariantRecord>,
    /// `"<table>:<id>"` for every upsert attempt, in call order.
    pub ops: Vec<String>,
    pub runs: Vec<NewSyncRun>,
    pub last_sync_writes: usize,
}

impl MemoryStore {
    pub fn with_products(ids: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            for id in ids {
                state.products.insert(
                    (*id).to_owned(),
                    ProductRecord {
                        id: (*id).to_owned(),
                        name: format!("Seeded {id}"),
                        description: None,
                        image_url: None,
                        category_id: None,
                        prices: BTreeMap::new(),
                        stock: BTreeMap::new(),
                    },
                );
            }
        }
        store
    }

    pub fn snapshot(&self) -> State {
        self.state.lock().unwrap().clone()
    }
}

fn replace<T: PartialEq>(map: &mut BTreeMap<String, T>, id: &str, value: T) -> bool {
    if map.get(id) == Some(&value) {
        return false;
    }
    map.insert(id.to_owned(), value);
    true
}

impl CatalogStore for MemoryStore {
    async fn upsert_category(&self, category: &CategoryRecord) -> Result<bool, DbError> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("category:{}", category.id));
        Ok(replace(&mut state.categories, &category.id, category.clone()))
    }

    async fn upsert_store(&self, store: &WarehouseRecord) -> Result<bool, DbError> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("store:{}", store.id));
        Ok(replace(&mut state.stores, &store.id, store.clone()))
    }

    async fn upsert_product(&self, product: &ProductRecord) -> Result<bool, DbError> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("product:{}", product.id));
        Ok(replace(&mut state.products, &product.id, product.clone()))
    }

    async fn upsert_variant(&self, variant: &VariantRecord) -> Result<bool, DbError> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("variant:{}", variant.id));
        if !state.products.contains_key(&variant.product_id) {
            return Err(DbError::Sqlx(sqlx::Error::Protocol(
                "insert on table \"variants\" violates foreign key constraint".to_owned(),
            )));
        }
        Ok(replace(&mut state.variants, &variant.id, variant.clone()))
    }

    async fn product_exists(&self, id: &str) -> Result<bool, DbError> {
        Ok(self.state.lock().unwrap().products.contains_key(id))
    }

    async fn record_sync_run(&self, run: &NewSyncRun) -> Result<(), DbError> {
        self.state.lock().unwrap().runs.push(run.clone());
        Ok(())
    }

    async fn record_last_sync(&self) -> Result<(), DbError> {
        self.state.lock().unwrap().last_sync_writes += 1;
        Ok(())
    }
}

pub fn source_config(base_url: &str) -> SourceConfig {
    SourceConfig {
        base_url: base_url.to_owned(),
        token: Some("test-token".to_owned()),
        page_limit: 1000,
        timeout_secs: 5,
        max_retries: 0,
        backoff_base_ms: 0,
    }
}

pub fn source_client(server: &MockServer) -> SourceClient {
    SourceClient::new(&source_config(&server.uri())).expect("source client")
}

pub fn storage_client(server: &MockServer) -> StorageClient {
    StorageClient::new(&StorageConfig {
        url: server.uri(),
        key: "service-key".to_owned(),
        bucket: "images".to_owned(),
        timeout_secs: 5,
    })
    .expect("storage client")
}

pub fn syncer(server: &MockServer, store: MemoryStore) -> Syncer<MemoryStore> {
    Syncer::new(
        source_client(server),
        storage_client(server),
        store,
        Duration::ZERO,
    )
}

pub fn link(base: &str, kind: &str, id: &str) -> Value {
    json!({ "meta": { "href": format!("{base}/entity/{kind}/{id}"), "type": kind } })
}

pub fn page(rows: Vec<Value>) -> Value {
    json!({
        "meta": { "href": "list", "size": rows.len(), "limit": 1000, "offset": 0 },
        "rows": rows
    })
}

pub async fn mount_rows(server: &MockServer, endpoint: &str, rows: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(rows)))
        .mount(server)
        .await;
}

/// Price tier `tier-a` named `Retail` and warehouse `s-1` named `Main`.
pub async fn mount_reference(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/context/companysettings/pricetype"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "tier-a", "name": "Retail" }
        ])))
        .mount(server)
        .await;
    mount_rows(
        server,
        "/entity/store",
        vec![json!({ "id": "s-1", "name": "Main" })],
    )
    .await;
}

/// Every stock report answers with an empty breakdown.
pub async fn mount_empty_stock(server: &MockServer) {
    mount_rows(server, "/report/stock/bystore", vec![]).await;
}

pub fn folder(base: &str, id: &str, name: &str, parent: Option<&str>) -> Value {
    let mut row = json!({ "id": id, "name": name });
    if let Some(parent) = parent {
        row["productFolder"] = link(base, "productfolder", parent);
    }
    row
}

pub fn product(base: &str, id: &str, name: &str, minor_price: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "Loose leaf",
        "salePrices": [
            { "value": minor_price, "priceType": { "meta": { "href": format!("{base}/context/companysettings/pricetype/tier-a") } } }
        ]
    })
}

pub fn variant(base: &str, id: &str, product_id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Variant {id}"),
        "product": link(base, "product", product_id),
        "characteristics": [{ "name": "Weight", "value": "250g" }],
        "salePrices": []
    })
}

/// Paths of every request the server has seen.
pub async fn request_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.path().to_owned())
        .collect()
}
