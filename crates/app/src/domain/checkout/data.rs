//! Checkout Data

use uuid::Uuid;

use crate::domain::products::records::ProductUuid;

/// A checkout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheckout {
    pub customer_email: String,
    pub user_uuid: Option<Uuid>,
    pub lines: Vec<CheckoutLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutLine {
    pub product: ProductUuid,
    pub quantity: u32,
}
