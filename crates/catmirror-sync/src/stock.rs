//! Stock extraction from the per-store stock report.
//!
//! Rows are read as `rows[].stockByStore[]` for both products and variants.
//! Only rows describing the requested subject are used.

use catmirror_core::StockMap;
use catmirror_source::{StockReportRow, StockSubject, WarehouseMap};

/// Builds `{warehouse name: quantity}` for one product or variant.
///
/// Store ids are resolved through `warehouses`; unknown ids are dropped with a
/// warning. Quantities reported more than once for a warehouse are summed.
#[must_use]
pub fn extract_stock(
    record_id: &str,
    rows: &[StockReportRow],
    subject: StockSubject,
    warehouses: &WarehouseMap,
) -> StockMap {
    let mut stock = StockMap::new();

    for row in rows {
        if row.meta.kind.as_deref() != Some(subject.as_str()) {
            continue;
        }

        for entry in &row.stock_by_store {
            let Some(quantity) = entry.stock.filter(|q| q.is_finite()) else {
                continue;
            };
            let store_id = entry.store_id();
            let Some(name) = store_id.as_ref().and_then(|id| warehouses.get(id)) else {
                tracing::warn!(
                    record_id,
                    store_id = store_id.as_deref().unwrap_or_default(),
                    "sync: stock entry references unknown warehouse; dropped"
                );
                continue;
            };
            *stock.entry(name.clone()).or_insert(0.0) += quantity;
        }
    }

    stock
}

#[cfg(test)]
mod tests {
    use catmirror_source::{Meta, StoreStock};

    use super::*;

    fn meta(href: &str, kind: Option<&str>) -> Meta {
        Meta {
            href: href.to_owned(),
            kind: kind.map(str::to_owned),
            size: None,
            download_href: None,
        }
    }

    fn store(id: &str, stock: Option<f64>) -> StoreStock {
        StoreStock {
            meta: Some(meta(&format!("https://host/entity/store/{id}"), Some("store"))),
            name: None,
            stock,
        }
    }

    fn row(kind: &str, entries: Vec<StoreStock>) -> StockReportRow {
        StockReportRow {
            meta: meta("https://host/entity/product/p-1", Some(kind)),
            stock_by_store: entries,
        }
    }

    fn warehouses() -> WarehouseMap {
        WarehouseMap::from([
            ("s-1".to_owned(), "Main".to_owned()),
            ("s-2".to_owned(), "Annex".to_owned()),
        ])
    }

    #[test]
    fn maps_store_ids_to_names() {
        let stock = extract_stock(
            "p-1",
            &[row("product", vec![store("s-1", Some(4.0)), store("s-2", Some(0.0))])],
            StockSubject::Product,
            &warehouses(),
        );
        assert_eq!(stock.get("Main"), Some(&4.0));
        assert_eq!(stock.get("Annex"), Some(&0.0));
    }

    #[test]
    fn drops_unknown_warehouses() {
        let stock = extract_stock(
            "p-1",
            &[row("product", vec![store("s-9", Some(7.0)), store("s-1", Some(1.0))])],
            StockSubject::Product,
            &warehouses(),
        );
        assert_eq!(stock.len(), 1);
        assert_eq!(stock.get("Main"), Some(&1.0));
    }

    #[test]
    fn entry_without_link_is_dropped_alone() {
        let orphan = StoreStock {
            meta: None,
            name: Some("Ghost".to_owned()),
            stock: Some(1.0),
        };
        let stock = extract_stock(
            "p-1",
            &[row("product", vec![store("s-1", Some(5.0)), orphan])],
            StockSubject::Product,
            &warehouses(),
        );
        assert_eq!(stock.len(), 1);
        assert_eq!(stock.get("Main"), Some(&5.0));
    }

    #[test]
    fn ignores_rows_for_other_subjects() {
        let stock = extract_stock(
            "v-1",
            &[
                row("product", vec![store("s-1", Some(10.0))]),
                row("variant", vec![store("s-1", Some(2.0))]),
            ],
            StockSubject::Variant,
            &warehouses(),
        );
        assert_eq!(stock.get("Main"), Some(&2.0));
    }

    #[test]
    fn sums_repeated_warehouses() {
        let stock = extract_stock(
            "p-1",
            &[
                row("product", vec![store("s-1", Some(1.5))]),
                row("product", vec![store("s-1", Some(2.5)), store("s-2", None)]),
            ],
            StockSubject::Product,
            &warehouses(),
        );
        assert_eq!(stock.get("Main"), Some(&4.0));
        assert!(!stock.contains_key("Annex"));
    }
}
