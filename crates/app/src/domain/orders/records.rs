//! Order Records

use jiff::Timestamp;
use uuid::Uuid;

use crate::{
    domain::{
        orders::status::OrderStatus, payments::records::PaymentRecord,
        products::records::ProductUuid,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Line UUID
pub type OrderLineUuid = TypedUuid<OrderLineRecord>;

/// Order Record
///
/// `total == subtotal + shipping`, and `subtotal` is the sum of the line
/// snapshots. All three are written once at checkout; the database rejects
/// later changes.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub user_uuid: Option<Uuid>,
    pub customer_email: String,
    pub status: OrderStatus,
    pub subtotal: u64,
    pub shipping: u64,
    pub total: u64,
    pub currency: String,
    pub lines: Vec<OrderLineRecord>,
    pub payments: Vec<PaymentRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Order Line Record
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineRecord {
    pub uuid: OrderLineUuid,
    pub order_uuid: OrderUuid,
    pub position: u32,
    pub product_uuid: ProductUuid,
    pub name_snapshot: String,
    pub price_snapshot: u64,
    pub quantity: u32,
    pub created_at: Timestamp,
}

impl OrderLineRecord {
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.price_snapshot.checked_mul(u64::from(self.quantity))
    }
}
