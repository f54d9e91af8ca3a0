//! The destination-store seam used by the synchronizers.
//!
//! Production code runs against [`PgPool`]; tests substitute an in-memory
//! implementation. Upserts report whether anything was written so a replay of
//! unchanged source data can be observed as a no-op.

use std::future::Future;

use catmirror_core::{CategoryRecord, ProductRecord, VariantRecord, WarehouseRecord};
use sqlx::PgPool;

use crate::{DbError, NewSyncRun};

pub trait CatalogStore: Send + Sync {
    fn upsert_category(
        &self,
        category: &CategoryRecord,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    fn upsert_store(
        &self,
        store: &WarehouseRecord,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    fn upsert_product(
        &self,
        product: &ProductRecord,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    fn upsert_variant(
        &self,
        variant: &VariantRecord,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    fn product_exists(&self, id: &str) -> impl Future<Output = Result<bool, DbError>> + Send;

    fn record_sync_run(&self, run: &NewSyncRun) -> impl Future<Output = Result<(), DbError>> + Send;

    fn record_last_sync(&self) -> impl Future<Output = Result<(), DbError>> + Send;
}

impl CatalogStore for PgPool {
    async fn upsert_category(&self, category: &CategoryRecord) -> Result<bool, DbError> {
        crate::upsert_category(self, category).await
    }

    async fn upsert_store(&self, store: &WarehouseRecord) -> Result<bool, DbError> {
        crate::upsert_store(self, store).await
    }

    async fn upsert_product(&self, product: &ProductRecord) -> Result<bool, DbError> {
        crate::upsert_product(self, product).await
    }

    async fn upsert_variant(&self, variant: &VariantRecord) -> Result<bool, DbError> {
        crate::upsert_variant(self, variant).await
    }

    async fn product_exists(&self, id: &str) -> Result<bool, DbError> {
        crate::product_exists(self, id).await
    }

    async fn record_sync_run(&self, run: &NewSyncRun) -> Result<(), DbError> {
        crate::insert_sync_run(self, run).await.map(|_| ())
    }

    async fn record_last_sync(&self) -> Result<(), DbError> {
        crate::record_last_sync(self).await
    }
}
