//! Create Checkout Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use checkout_app::domain::{
    checkout::data::{CheckoutLine, NewCheckout},
    orders::records::OrderRecord,
    products::records::ProductUuid,
};

use crate::{errors::into_status_error, extensions::*, state::State};

/// Checkout Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutRequest {
    /// Email address the order is placed under
    pub customer_email: String,

    /// Signed-in user placing the order, if any
    #[serde(default)]
    pub user_uuid: Option<Uuid>,

    /// Products and quantities to purchase, in display order
    pub items: Vec<CheckoutItemRequest>,
}

/// Checkout Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutItemRequest {
    /// Product to purchase
    pub product_uuid: Uuid,

    /// Units to purchase
    #[serde(alias = "qty")]
    pub quantity: u32,
}

impl From<CheckoutRequest> for NewCheckout {
    fn from(request: CheckoutRequest) -> Self {
        NewCheckout {
            customer_email: request.customer_email,
            user_uuid: request.user_uuid,
            lines: request
                .items
                .into_iter()
                .map(|item| CheckoutLine {
                    product: ProductUuid::from_uuid(item.product_uuid),
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

/// Order Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderCreatedResponse {
    /// Created order UUID
    pub order_uuid: Uuid,

    /// Order status, always `pending` on creation
    pub status: String,

    /// Sum of line totals, in minor units
    pub subtotal: u64,

    /// Shipping charge, in minor units
    pub shipping: u64,

    /// Amount due, in minor units
    pub total: u64,

    /// ISO 4217 currency code, lowercase
    pub currency: String,
}

impl From<OrderRecord> for OrderCreatedResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            order_uuid: order.uuid.into_uuid(),
            status: order.status.to_string(),
            subtotal: order.subtotal,
            shipping: order.shipping,
            total: order.total,
            currency: order.currency,
        }
    }
}

/// Create Checkout Handler
///
/// Reserves stock for every item and records a pending order in one step.
#[endpoint(
    tags("checkout"),
    summary = "Place Order",
    responses(
        (status_code = StatusCode::CREATED, description = "Order created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid checkout"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Busy, retry"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CheckoutRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderCreatedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let order = state
        .app
        .checkout
        .create_order(json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(order.into()))
}
