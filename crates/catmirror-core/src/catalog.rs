use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Price-tier name → amount in major currency units.
pub type PriceMap = BTreeMap<String, Decimal>;

/// Warehouse display name → on-hand quantity.
pub type StockMap = BTreeMap<String, f64>;

/// The three mirrored entity collections, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncEntity {
    Categories,
    Products,
    Variants,
}

impl SyncEntity {
    /// All entities in the order a full sync must run them.
    pub const ALL: [SyncEntity; 3] = [
        SyncEntity::Categories,
        SyncEntity::Products,
        SyncEntity::Variants,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SyncEntity::Categories => "categories",
            SyncEntity::Products => "products",
            SyncEntity::Variants => "variants",
        }
    }
}

impl std::fmt::Display for SyncEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncEntity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "categories" | "category" => Ok(SyncEntity::Categories),
            "products" | "product" => Ok(SyncEntity::Products),
            "variants" | "variant" | "modifications" => Ok(SyncEntity::Variants),
            other => Err(CoreError::UnknownEntity(other.to_string())),
        }
    }
}

/// A product folder from the source catalog, shaped for the `categories` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    /// Parent folder id. Folders form a forest; cycles are not checked.
    pub parent_id: Option<String>,
}

/// A warehouse, persisted so stock names can be traced back to ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Public object-storage URL of the mirrored primary image.
    pub image_url: Option<String>,
    pub category_id: Option<String>,
    pub prices: PriceMap,
    pub stock: StockMap,
}

/// A product modification (size, colour, ...). Always tied to one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub id: String,
    pub product_id: String,
    pub name: String,
    /// Attribute list copied verbatim from the source.
    pub characteristics: Option<serde_json::Value>,
    pub image_url: Option<String>,
    pub prices: PriceMap,
    pub stock: StockMap,
}
