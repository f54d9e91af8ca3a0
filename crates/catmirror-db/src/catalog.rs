//! Database operations for `categories`, `stores`, `products`, and `variants`.
//!
//! Every upsert is keyed by the source-assigned id and only rewrites a row
//! when at least one mirrored column differs, so replaying an unchanged
//! source dataset leaves the tables (including `updated_at`) untouched.

use catmirror_core::{
    CategoryRecord, PriceMap, ProductRecord, StockMap, VariantRecord, WarehouseRecord,
};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Number, Value};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `categories` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<String>,
    /// JSON object of tier name → number.
    pub prices: Value,
    /// JSON object of warehouse name → number.
    pub stock: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `variants` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VariantRow {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub characteristics: Option<Value>,
    pub image_url: Option<String>,
    pub prices: Value,
    pub stock: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// JSON encoding
// ---------------------------------------------------------------------------

/// Encodes prices as a JSON object of plain numbers (`{"Retail": 150.0}`).
///
/// # Errors
///
/// Returns [`DbError::Encode`] if an amount has no finite `f64` form.
pub(crate) fn prices_json(prices: &PriceMap) -> Result<Value, DbError> {
    let mut object = Map::with_capacity(prices.len());
    for (tier, amount) in prices {
        let number = amount
            .to_f64()
            .and_then(Number::from_f64)
            .ok_or_else(|| DbError::Encode {
                field: "prices",
                reason: format!("amount {amount} for tier \"{tier}\" is not representable"),
            })?;
        object.insert(tier.clone(), Value::Number(number));
    }
    Ok(Value::Object(object))
}

/// # Errors
///
/// Returns [`DbError::Encode`] if a quantity is NaN or infinite.
pub(crate) fn stock_json(stock: &StockMap) -> Result<Value, DbError> {
    let mut object = Map::with_capacity(stock.len());
    for (warehouse, quantity) in stock {
        let number = Number::from_f64(*quantity).ok_or_else(|| DbError::Encode {
            field: "stock",
            reason: format!("quantity for warehouse \"{warehouse}\" is not finite"),
        })?;
        object.insert(warehouse.clone(), Value::Number(number));
    }
    Ok(Value::Object(object))
}

// ---------------------------------------------------------------------------
// Upserts
// ---------------------------------------------------------------------------

/// Upserts a category row keyed by `id`.
///
/// Returns `true` when a row was inserted or changed, `false` when the stored
/// row already matched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_category(pool: &PgPool, category: &CategoryRecord) -> Result<bool, DbError> {
    let rows_affected = sqlx::query(
        "INSERT INTO categories (id, name, parent_id) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (id) DO UPDATE SET \
             name       = EXCLUDED.name, \
             parent_id  = EXCLUDED.parent_id, \
             updated_at = NOW() \
         WHERE (categories.name, categories.parent_id) \
               IS DISTINCT FROM (EXCLUDED.name, EXCLUDED.parent_id)",
    )
    .bind(&category.id)
    .bind(&category.name)
    .bind(&category.parent_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Upserts a warehouse row keyed by `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_store(pool: &PgPool, store: &WarehouseRecord) -> Result<bool, DbError> {
    let rows_affected = sqlx::query(
        "INSERT INTO stores (id, name) \
         VALUES ($1, $2) \
         ON CONFLICT (id) DO UPDATE SET \
             name       = EXCLUDED.name, \
             updated_at = NOW() \
         WHERE stores.name IS DISTINCT FROM EXCLUDED.name",
    )
    .bind(&store.id)
    .bind(&store.name)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Upserts a product row keyed by `id`.
///
/// `prices` and `stock` are bound as JSON and compared with `jsonb` equality,
/// so key order and `150` vs `150.0` do not count as changes.
///
/// # Errors
///
/// Returns [`DbError::Encode`] if prices or stock cannot be encoded, or
/// [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_product(pool: &PgPool, product: &ProductRecord) -> Result<bool, DbError> {
    let prices = prices_json(&product.prices)?;
    let stock = stock_json(&product.stock)?;

    let rows_affected = sqlx::query(
        "INSERT INTO products \
             (id, name, description, image_url, category_id, prices, stock) \
         VALUES ($1, $2, $3, $4, $5, $6::jsonb, $7::jsonb) \
         ON CONFLICT (id) DO UPDATE SET \
             name        = EXCLUDED.name, \
             description = EXCLUDED.description, \
             image_url   = EXCLUDED.image_url, \
             category_id = EXCLUDED.category_id, \
             prices      = EXCLUDED.prices, \
             stock       = EXCLUDED.stock, \
             updated_at  = NOW() \
         WHERE (products.name, products.description, products.image_url, \
                products.category_id, products.prices, products.stock) \
               IS DISTINCT FROM \
               (EXCLUDED.name, EXCLUDED.description, EXCLUDED.image_url, \
                EXCLUDED.category_id, EXCLUDED.prices, EXCLUDED.stock)",
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(&product.image_url)
    .bind(&product.category_id)
    .bind(prices)
    .bind(stock)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Upserts a variant row keyed by `id`.
///
/// The `product_id` foreign key is enforced by the schema as well; callers
/// are expected to check [`product_exists`] first so a missing parent is
/// reported as a skip rather than a constraint violation.
///
/// # Errors
///
/// Returns [`DbError::Encode`] if prices or stock cannot be encoded, or
/// [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_variant(pool: &PgPool, variant: &VariantRecord) -> Result<bool, DbError> {
    let prices = prices_json(&variant.prices)?;
    let stock = stock_json(&variant.stock)?;

    let rows_affected = sqlx::query(
        "INSERT INTO variants \
             (id, product_id, name, characteristics, image_url, prices, stock) \
         VALUES ($1, $2, $3, $4::jsonb, $5, $6::jsonb, $7::jsonb) \
         ON CONFLICT (id) DO UPDATE SET \
             product_id      = EXCLUDED.product_id, \
             name            = EXCLUDED.name, \
             characteristics = EXCLUDED.characteristics, \
             image_url       = EXCLUDED.image_url, \
             prices          = EXCLUDED.prices, \
             stock           = EXCLUDED.stock, \
             updated_at      = NOW() \
         WHERE (variants.product_id, variants.name, variants.characteristics, \
                variants.image_url, variants.prices, variants.stock) \
               IS DISTINCT FROM \
               (EXCLUDED.product_id, EXCLUDED.name, EXCLUDED.characteristics, \
                EXCLUDED.image_url, EXCLUDED.prices, EXCLUDED.stock)",
    )
    .bind(&variant.id)
    .bind(&variant.product_id)
    .bind(&variant.name)
    .bind(&variant.characteristics)
    .bind(&variant.image_url)
    .bind(prices)
    .bind(stock)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Returns `true` if a product with `id` is present in the mirror.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn product_exists(pool: &PgPool, id: &str) -> Result<bool, DbError> {
    let exists: bool =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_category(pool: &PgPool, id: &str) -> Result<Option<CategoryRow>, DbError> {
    let row = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, name, parent_id, created_at, updated_at \
         FROM categories WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &PgPool, id: &str) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, description, image_url, category_id, prices, stock, \
                created_at, updated_at \
         FROM products WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_variant(pool: &PgPool, id: &str) -> Result<Option<VariantRow>, DbError> {
    let row = sqlx::query_as::<_, VariantRow>(
        "SELECT id, product_id, name, characteristics, image_url, prices, stock, \
                created_at, updated_at \
         FROM variants WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn prices_json_emits_plain_numbers() {
        let mut prices = PriceMap::new();
        prices.insert("Retail".to_string(), Decimal::new(15_000, 2));
        prices.insert("Wholesale".to_string(), Decimal::new(12_550, 2));

        let json = prices_json(&prices).expect("encode");
        assert_eq!(json["Retail"].as_f64(), Some(150.0));
        assert_eq!(json["Wholesale"].as_f64(), Some(125.5));
    }

    #[test]
    fn stock_json_rejects_nan() {
        let mut stock = StockMap::new();
        stock.insert("Main".to_string(), f64::NAN);

        let err = stock_json(&stock).unwrap_err();
        assert!(matches!(err, DbError::Encode { field: "stock", .. }));
    }

    #[test]
    fn empty_maps_encode_as_empty_objects() {
        assert_eq!(
            prices_json(&PriceMap::new()).unwrap(),
            serde_json::json!({})
        );
        assert_eq!(stock_json(&StockMap::new()).unwrap(), serde_json::json!({}));
    }
}
