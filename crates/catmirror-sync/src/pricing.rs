use catmirror_core::PriceMap;
use catmirror_source::{PriceTierMap, SalePrice};
use rust_decimal::Decimal;

/// Builds `{tier name: amount}` from a record's `salePrices`.
///
/// Source values are minor units and are divided by 100. Entries whose tier
/// cannot be resolved, or whose value is missing or not finite, are dropped.
#[must_use]
pub fn extract_prices(sale_prices: &[SalePrice], tiers: &PriceTierMap) -> PriceMap {
    sale_prices
        .iter()
        .filter_map(|price| {
            let tier_id = price.price_type.as_ref()?.target_id()?;
            let tier_name = tiers.get(&tier_id)?;
            let minor = Decimal::try_from(price.value?).ok()?;
            Some((tier_name.clone(), minor / Decimal::ONE_HUNDRED))
        })
        .collect()
}
