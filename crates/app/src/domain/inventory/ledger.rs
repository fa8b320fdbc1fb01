//! Stock reservations against the row-locked product counter.

use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::domain::{
    inventory::errors::InventoryError,
    pricing::PriceSnapshot,
    products::{
        PgProductsRepository,
        records::{ProductRecord, ProductUuid},
    },
};

/// Units taken off the shelf inside an open unit of work.
///
/// Nothing is durable until the enclosing transaction commits; dropping the
/// transaction releases the reservation along with everything else.
#[derive(Debug, Clone)]
pub struct Reservation {
    /// The locked read the stock check was made against.
    pub product: ProductRecord,
    pub quantity: u64,
    pub remaining: u64,
}

impl Reservation {
    #[must_use]
    pub fn snapshot(&self) -> PriceSnapshot {
        PriceSnapshot::of(&self.product)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PgInventoryLedger {
    products: PgProductsRepository,
}

impl PgInventoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            products: PgProductsRepository::new(),
        }
    }

    /// Reserve `quantity` units of `product` inside `tx`.
    ///
    /// The product row stays locked until `tx` finishes, so a concurrent
    /// reservation of the same product waits here and then sees the
    /// decremented stock.
    ///
    /// # Errors
    ///
    /// [`InventoryError::NotFound`] for unknown or inactive products,
    /// [`InventoryError::InsufficientStock`] when fewer than `quantity` units
    /// remain.
    pub async fn reserve(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<Reservation, InventoryError> {
        let record = self
            .products
            .lock_product(tx, product)
            .await?
            .filter(|record| record.is_active)
            .ok_or(InventoryError::NotFound(product))?;

        if record.stock < quantity {
            return Err(InventoryError::InsufficientStock {
                product,
                requested: quantity,
                available: record.stock,
            });
        }

        let remaining = self
            .products
            .decrement_stock(tx, product, quantity)
            .await?
            .ok_or(InventoryError::InsufficientStock {
                product,
                requested: quantity,
                available: record.stock,
            })?;

        debug!(product_uuid = %product, quantity, remaining, "reserved stock");

        Ok(Reservation {
            product: record,
            quantity,
            remaining,
        })
    }
}
