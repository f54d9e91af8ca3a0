use catmirror_source::{PriceTierMap, SourceClient, SourceError, WarehouseMap};

/// Lookup tables shared by the product and variant stages of one pass.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub price_tiers: PriceTierMap,
    pub warehouses: WarehouseMap,
}

impl ReferenceData {
    /// Fetches price tiers and warehouses.
    ///
    /// # Errors
    ///
    /// Returns the first [`SourceError`] from either request.
    pub async fn fetch(source: &SourceClient) -> Result<Self, SourceError> {
        let price_tiers = source.fetch_price_tiers().await?;
        let warehouses = source.fetch_warehouses().await?;
        tracing::info!(
            price_tiers = price_tiers.len(),
            warehouses = warehouses.len(),
            "sync: reference data loaded"
        );
        Ok(Self {
            price_tiers,
            warehouses,
        })
    }
}
