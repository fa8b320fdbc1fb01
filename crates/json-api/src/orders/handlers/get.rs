//! Get Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use checkout_app::domain::{
    orders::records::{OrderLineRecord, OrderRecord, OrderUuid},
    payments::records::PaymentRecord,
};

use crate::{errors::into_status_error, extensions::*, state::State};

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    /// The unique identifier of the order
    pub uuid: Uuid,

    /// The user who placed the order, if signed in
    pub user_uuid: Option<Uuid>,

    /// Email address the order was placed under
    pub customer_email: String,

    /// Current lifecycle status
    pub status: String,

    /// Sum of line totals, in minor units
    pub subtotal: u64,

    /// Shipping charge, in minor units
    pub shipping: u64,

    /// Amount due, in minor units
    pub total: u64,

    /// ISO 4217 currency code, lowercase
    pub currency: String,

    /// Purchased lines, in checkout order
    pub lines: Vec<OrderLineResponse>,

    /// Payment attempts, oldest first
    pub payments: Vec<PaymentResponse>,

    /// The date and time the order was placed
    pub created_at: String,

    /// The date and time the order last changed status
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        OrderResponse {
            uuid: order.uuid.into_uuid(),
            user_uuid: order.user_uuid,
            customer_email: order.customer_email,
            status: order.status.to_string(),
            subtotal: order.subtotal,
            shipping: order.shipping,
            total: order.total,
            currency: order.currency,
            lines: order.lines.into_iter().map(OrderLineResponse::from).collect(),
            payments: order
                .payments
                .into_iter()
                .map(PaymentResponse::from)
                .collect(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Order Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderLineResponse {
    /// The unique identifier of the line
    pub uuid: Uuid,

    /// The product purchased
    pub product_uuid: Uuid,

    /// Product name at the time of purchase
    pub name: String,

    /// Unit price at the time of purchase, in minor units
    pub unit_price: u64,

    /// Units purchased
    pub quantity: u32,
}

impl From<OrderLineRecord> for OrderLineResponse {
    fn from(line: OrderLineRecord) -> Self {
        Self {
            uuid: line.uuid.into_uuid(),
            product_uuid: line.product_uuid.into_uuid(),
            name: line.name_snapshot,
            unit_price: line.price_snapshot,
            quantity: line.quantity,
        }
    }
}

/// Payment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentResponse {
    /// The unique identifier of the payment
    pub uuid: Uuid,

    /// Payment provider name
    pub provider: String,

    /// The provider's identifier for the payment
    pub provider_ref: String,

    /// `pending`, `succeeded` or `failed`
    pub status: String,

    /// Amount requested, in minor units
    pub amount: u64,

    /// ISO 4217 currency code, lowercase
    pub currency: String,

    /// The date and time the payment was created
    pub created_at: String,

    /// The date and time the payment last changed
    pub updated_at: String,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(payment: PaymentRecord) -> Self {
        Self {
            uuid: payment.uuid.into_uuid(),
            provider: payment.provider,
            provider_ref: payment.provider_ref,
            status: payment.status.to_string(),
            amount: payment.amount,
            currency: payment.currency,
            created_at: payment.created_at.to_string(),
            updated_at: payment.updated_at.to_string(),
        }
    }
}

/// Get Order Handler
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let order = state
        .app
        .orders
        .get_order(OrderUuid::from_uuid(order.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
