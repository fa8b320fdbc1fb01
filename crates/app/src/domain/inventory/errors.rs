//! Inventory ledger errors.

use thiserror::Error;

use crate::domain::products::records::ProductUuid;

#[derive(Debug, Error)]
pub enum InventoryError {
    /// The product does not exist or is not active.
    #[error("product {0} not found")]
    NotFound(ProductUuid),

    #[error("insufficient stock for product {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: ProductUuid,
        requested: u64,
        available: u64,
    },

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}
