//! Orders Data

use uuid::Uuid;

use crate::domain::{
    orders::{records::OrderUuid, totals::OrderTotals},
    pricing::PriceSnapshot,
    products::records::ProductUuid,
};

/// A line ready to be written, priced from the locked product read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product: ProductUuid,
    pub snapshot: PriceSnapshot,
    pub quantity: u32,
}

/// A pending order ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub user_uuid: Option<Uuid>,
    pub customer_email: String,
    pub currency: String,
    pub totals: OrderTotals,
}
