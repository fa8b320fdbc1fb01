//! Update Order Status Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use checkout_app::domain::orders::{
    OrdersServiceError, records::OrderUuid, status::OrderStatus,
};

use crate::{errors::into_status_error, extensions::*, state::State};

/// Update Order Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateOrderStatusRequest {
    /// Target status: `processing`, `shipped`, `delivered` or `cancelled`
    pub status: String,
}

/// Order Status Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderStatusResponse {
    /// The unique identifier of the order
    pub uuid: Uuid,

    /// Status after the update
    pub status: String,
}

/// Update Order Status Handler
///
/// Administrative lifecycle changes. `paid` and `failed` are reached only
/// through payment reconciliation.
#[endpoint(
    tags("orders"),
    summary = "Update Order Status",
    responses(
        (status_code = StatusCode::OK, description = "Status updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Transition not allowed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateOrderStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderStatusResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let status = json
        .into_inner()
        .status
        .parse::<OrderStatus>()
        .map_err(|error| into_status_error(OrdersServiceError::from(error)))?;

    let order = state
        .app
        .orders
        .update_status(OrderUuid::from_uuid(order.into_inner()), status)
        .await
        .map_err(into_status_error)?;

    Ok(Json(OrderStatusResponse {
        uuid: order.uuid.into_uuid(),
        status: order.status.to_string(),
    }))
}
