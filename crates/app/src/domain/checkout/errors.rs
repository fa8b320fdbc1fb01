//! Checkout service errors.

use thiserror::Error;

use crate::{
    database::{DeadlineExceeded, StorageFailure, classify},
    domain::{
        inventory::InventoryError, orders::totals::TotalsOverflow, products::records::ProductUuid,
    },
    errors::ErrorKind,
};

#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    #[error("checkout has no items")]
    EmptyCart,

    #[error("customer email is required")]
    MissingEmail,

    #[error("quantity for product {0} must be greater than zero")]
    InvalidQuantity(ProductUuid),

    #[error("quantity for product {0} is too large")]
    QuantityTooLarge(ProductUuid),

    #[error("products in one checkout must share a currency")]
    MixedCurrency,

    #[error(transparent)]
    TotalsOverflow(#[from] TotalsOverflow),

    #[error("product {0} not found")]
    ProductNotFound(ProductUuid),

    #[error("insufficient stock for product {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: ProductUuid,
        requested: u64,
        available: u64,
    },

    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),

    /// Lock wait, statement timeout or deadlock; nothing was committed.
    #[error("checkout could not acquire stock in time")]
    Contention(#[source] sqlx::Error),

    #[error("storage error")]
    Sql(#[source] sqlx::Error),
}

impl CheckoutServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyCart
            | Self::MissingEmail
            | Self::InvalidQuantity(_)
            | Self::QuantityTooLarge(_)
            | Self::MixedCurrency
            | Self::TotalsOverflow(_) => ErrorKind::Validation,
            Self::ProductNotFound(_) => ErrorKind::NotFound,
            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            Self::Deadline(_) | Self::Contention(_) => ErrorKind::Transient,
            Self::Sql(_) => ErrorKind::Persistence,
        }
    }
}

impl From<InventoryError> for CheckoutServiceError {
    fn from(error: InventoryError) -> Self {
        match error {
            InventoryError::NotFound(product) => Self::ProductNotFound(product),
            InventoryError::InsufficientStock {
                product,
                requested,
                available,
            } => Self::InsufficientStock {
                product,
                requested,
                available,
            },
            InventoryError::Sql(error) => error.into(),
        }
    }
}

impl From<sqlx::Error> for CheckoutServiceError {
    fn from(error: sqlx::Error) -> Self {
        match classify(&error) {
            StorageFailure::Timeout | StorageFailure::Conflict => Self::Contention(error),
            _ => Self::Sql(error),
        }
    }
}
