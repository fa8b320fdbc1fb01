//! Pricing Snapshot

use crate::domain::products::records::ProductRecord;

/// Catalog data frozen onto an order line at the instant of purchase.
///
/// Always taken from the locked read that backed the stock check, so the unit
/// being priced is the unit being reserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSnapshot {
    pub name: String,
    pub unit_price: u64,
    pub currency: String,
}

impl PriceSnapshot {
    #[must_use]
    pub fn of(product: &ProductRecord) -> Self {
        Self {
            name: product.name.clone(),
            unit_price: product.price,
            currency: product.currency.clone(),
        }
    }

    /// `unit_price * quantity`, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Option<u64> {
        self.unit_price.checked_mul(u64::from(quantity))
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use crate::domain::products::records::ProductUuid;

    use super::*;

    fn product(price: u64) -> ProductRecord {
        ProductRecord {
            uuid: ProductUuid::new(),
            name: "Linen Shirt".to_string(),
            price,
            currency: "usd".to_string(),
            stock: 3,
            version: 0,
            is_active: true,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn snapshot_copies_name_price_and_currency() {
        let snapshot = PriceSnapshot::of(&product(1250));

        assert_eq!(snapshot.name, "Linen Shirt");
        assert_eq!(snapshot.unit_price, 1250);
        assert_eq!(snapshot.currency, "usd");
    }

    #[test]
    fn snapshot_is_detached_from_later_catalog_edits() {
        let mut record = product(1000);
        let snapshot = PriceSnapshot::of(&record);

        record.price = 9999;
        record.name = "Renamed".to_string();

        assert_eq!(snapshot.unit_price, 1000);
        assert_eq!(snapshot.name, "Linen Shirt");
    }

    #[test]
    fn line_total_detects_overflow() {
        let snapshot = PriceSnapshot::of(&product(u64::MAX));

        assert_eq!(snapshot.line_total(1), Some(u64::MAX));
        assert_eq!(snapshot.line_total(2), None);
    }
}
