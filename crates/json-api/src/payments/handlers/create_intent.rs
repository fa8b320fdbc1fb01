//! Create Payment Intent Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use checkout_app::domain::{orders::records::OrderUuid, payments::data::CreatedIntent};

use crate::{errors::into_status_error, extensions::*, state::State};

/// Create Payment Intent Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateIntentRequest {
    /// Pending order to collect payment for
    pub order_uuid: Uuid,
}

/// Payment Intent Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentIntentResponse {
    /// Recorded payment UUID
    pub payment_uuid: Uuid,

    /// The provider's intent identifier
    pub payment_intent_id: String,

    /// Secret the client confirms the payment with
    pub client_secret: String,

    /// Amount requested, in minor units
    pub amount: u64,

    /// ISO 4217 currency code, lowercase
    pub currency: String,
}

impl From<CreatedIntent> for PaymentIntentResponse {
    fn from(intent: CreatedIntent) -> Self {
        Self {
            payment_uuid: intent.payment.uuid.into_uuid(),
            payment_intent_id: intent.payment.provider_ref,
            client_secret: intent.client_secret,
            amount: intent.payment.amount,
            currency: intent.payment.currency,
        }
    }
}

/// Create Payment Intent Handler
#[endpoint(
    tags("payments"),
    summary = "Create Payment Intent",
    responses(
        (status_code = StatusCode::CREATED, description = "Intent created"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order is not pending"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment provider error"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateIntentRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<PaymentIntentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let intent = state
        .app
        .payments
        .create_intent(OrderUuid::from_uuid(json.into_inner().order_uuid))
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(intent.into()))
}
