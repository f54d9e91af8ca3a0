//! Client for the inventory system's JSON API.
//!
//! Provides [`SourceClient`] for authenticated, paginated reads, the wire
//! types the synchronizers parse records into, and the `meta.href` reference
//! resolver.

pub mod client;
pub mod error;
pub mod refs;
pub(crate) mod retry;
pub mod types;

pub use client::{auth_headers, SourceClient, SourceConfig};
pub use error::SourceError;
pub use refs::{id_from_href, resolve_ref};
pub use types::{
    ImageRow, ImagesField, Meta, MetaLink, PriceTier, PriceTierMap, SalePrice, SourceFolder,
    SourceProduct, SourceVariant, SourceWarehouse, StockReportRow, StockSubject, StoreStock,
    WarehouseMap,
};
