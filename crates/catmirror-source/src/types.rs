//! Wire shapes returned by the inventory API.
//!
//! Only fields the mirror uses are modelled; everything else in a record is
//! ignored. Records are parsed one at a time so a single malformed entry can
//! be skipped without losing the page.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::refs::id_from_href;

/// Price-tier id to tier name, e.g. `"7a4f..." -> "Retail"`.
pub type PriceTierMap = BTreeMap<String, String>;

/// Warehouse id to warehouse name.
pub type WarehouseMap = BTreeMap<String, String>;

/// The `meta` object carried by every entity, link, and collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub href: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Total element count on collection metas.
    #[serde(default)]
    pub size: Option<u64>,
    /// Present on image rows.
    #[serde(rename = "downloadHref", default)]
    pub download_href: Option<String>,
}

/// A `{"meta": {...}}` reference to another entity.
#[derive(Debug, Clone, Deserialize)]
pub struct MetaLink {
    pub meta: Meta,
}

impl MetaLink {
    /// Id of the referenced entity, taken from the link's `href`.
    #[must_use]
    pub fn target_id(&self) -> Option<String> {
        id_from_href(&self.meta.href)
    }
}

/// Collection metadata on a paged response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ListMeta {
    #[serde(default)]
    pub size: Option<u64>,
}

/// A list endpoint answers either with a `{meta, rows}` page or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing {
    Page {
        #[serde(default)]
        meta: Option<ListMeta>,
        rows: Vec<Value>,
    },
    Bare(Vec<Value>),
}

/// A product folder (category).
#[derive(Debug, Clone, Deserialize)]
pub struct SourceFolder {
    pub id: String,
    pub name: String,
    #[serde(rename = "productFolder", default)]
    pub product_folder: Option<MetaLink>,
}

/// One `salePrices` entry. A malformed field reads as absent so the entry is
/// dropped on its own instead of failing the whole record.
#[derive(Debug, Clone, Deserialize)]
pub struct SalePrice {
    /// Minor currency units (kopecks).
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<f64>,
    #[serde(rename = "priceType", default, deserialize_with = "lenient")]
    pub price_type: Option<MetaLink>,
}

/// The `images` collection embedded in a product or variant.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesField {
    pub meta: Meta,
    #[serde(default)]
    pub rows: Vec<ImageRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageRow {
    pub meta: Meta,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "productFolder", default)]
    pub product_folder: Option<MetaLink>,
    #[serde(rename = "salePrices", default)]
    pub sale_prices: Vec<SalePrice>,
    #[serde(default)]
    pub images: Option<ImagesField>,
}

/// A variant ("modification"). The parent `product` link is required.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceVariant {
    pub id: String,
    pub name: String,
    pub product: MetaLink,
    #[serde(default)]
    pub characteristics: Option<Value>,
    #[serde(rename = "salePrices", default)]
    pub sale_prices: Vec<SalePrice>,
    #[serde(default)]
    pub images: Option<ImagesField>,
}

/// A price tier from company settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceTier {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceWarehouse {
    pub id: String,
    pub name: String,
}

/// One row of the per-store stock report.
#[derive(Debug, Clone, Deserialize)]
pub struct StockReportRow {
    pub meta: Meta,
    #[serde(rename = "stockByStore", default)]
    pub stock_by_store: Vec<StoreStock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreStock {
    #[serde(default, deserialize_with = "lenient")]
    pub meta: Option<Meta>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub stock: Option<f64>,
}

impl StoreStock {
    /// Id of the warehouse this entry counts, if its link is usable.
    #[must_use]
    pub fn store_id(&self) -> Option<String> {
        id_from_href(&self.meta.as_ref()?.href)
    }
}

/// Reads an optional nested field, treating a value of the wrong shape as
/// absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Which kind of entity a stock report is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockSubject {
    Product,
    Variant,
}

impl StockSubject {
    /// Entity path segment, filter key, and row `meta.type` for this subject.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StockSubject::Product => "product",
            StockSubject::Variant => "variant",
        }
    }
}
