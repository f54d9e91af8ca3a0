//! Catalog synchronization: mirrors categories, products, and variants from
//! the inventory API into the destination store.
//!
//! Each synchronizer fetches its collection, transforms records one at a
//! time, and upserts them. A failed collection fetch aborts the stage; a bad
//! record is logged and skipped. Nothing here returns an error to the caller
//! once a stage has started; outcomes are reported through [`SyncReport`].

pub mod assets;
pub mod categories;
pub mod error;
pub mod guard;
pub mod orchestrator;
pub mod pricing;
pub mod products;
pub mod reference;
pub mod report;
pub mod stock;
pub mod variants;

use catmirror_core::SyncEntity;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use assets::{image_key, mirror_image};
pub use categories::sync_categories;
pub use error::SyncError;
pub use guard::{JobGuard, RunningJob};
pub use orchestrator::Syncer;
pub use pricing::extract_prices;
pub use products::sync_products;
pub use reference::ReferenceData;
pub use report::{FullSyncReport, SyncReport, SyncStatus, SyncTrigger};
pub use stock::extract_stock;
pub use variants::sync_variants;

/// Parses one collection row, logging and returning `None` when it does not
/// have the expected shape.
pub(crate) fn parse_row<T: DeserializeOwned>(row: Value, entity: SyncEntity) -> Option<T> {
    let id = row
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("<unknown>")
        .to_owned();
    let name = row
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
        .to_owned();

    match serde_json::from_value::<T>(row) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(entity = %entity, id, name, error = %e, "sync: malformed record; skipping");
            None
        }
    }
}
