//! Payment Webhook Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use checkout_app::{domain::payments::stripe::SIGNATURE_HEADER, errors::ErrorKind};

use crate::{
    errors::into_status_error,
    extensions::*,
    observability::observe_webhook_event,
    state::State,
};

/// Provider payloads are small; anything larger is not a real event.
const MAX_WEBHOOK_BYTES: usize = 256 * 1024;

/// Webhook Received Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WebhookReceivedResponse {
    /// Always `true`; the provider only checks the status code
    pub received: bool,

    /// How the event was applied
    pub outcome: String,
}

/// Payment Webhook Handler
///
/// Verifies the signature over the raw body before anything is parsed. Every
/// verified event is acknowledged, including ones that change nothing, so
/// the provider stops redelivering it.
#[endpoint(
    tags("payments"),
    summary = "Payment Provider Webhook",
    responses(
        (status_code = StatusCode::OK, description = "Event acknowledged"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid signature or payload"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Busy, provider should retry"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<WebhookReceivedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let signature = req.header::<String>(SIGNATURE_HEADER).unwrap_or_default();

    let payload = req
        .payload_with_max_size(MAX_WEBHOOK_BYTES)
        .await
        .map_err(|source| {
            warn!("unreadable webhook body: {source}");
            observe_webhook_event(ErrorKind::Validation.as_str());

            StatusError::bad_request()
                .brief("unreadable webhook body")
                .detail(ErrorKind::Validation.as_str())
        })?
        .clone();

    match state.app.payments.reconcile(&payload, &signature).await {
        Ok(outcome) => {
            observe_webhook_event(outcome.as_str());
            info!(outcome = outcome.as_str(), "webhook acknowledged");

            Ok(Json(WebhookReceivedResponse {
                received: true,
                outcome: outcome.as_str().to_owned(),
            }))
        }
        Err(error) => {
            observe_webhook_event(error.kind().as_str());

            Err(into_status_error(error))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use checkout_app::{
        database::DeadlineExceeded,
        domain::payments::{MockPaymentsService, PaymentsServiceError, data::ReconcileOutcome},
    };

    use crate::test_helpers::payments_service;

    use super::*;

    const PAYLOAD: &str = r#"{"id":"evt_1","type":"payment_intent.succeeded"}"#;
    const SIGNATURE: &str = "t=1700000000,v1=deadbeef";

    fn make_service(payments: MockPaymentsService) -> Service {
        payments_service(payments, Router::with_path("payments/webhook").post(handler))
    }

    fn expect_reconcile(
        result: Result<ReconcileOutcome, PaymentsServiceError>,
    ) -> MockPaymentsService {
        let mut payments = MockPaymentsService::new();

        payments
            .expect_reconcile()
            .once()
            .withf(|payload, signature| payload == PAYLOAD.as_bytes() && signature == SIGNATURE)
            .return_once(move |_, _| result);

        payments.expect_create_intent().never();

        payments
    }

    #[tokio::test]
    async fn test_webhook_applied_event_is_acknowledged() -> TestResult {
        let mut res = TestClient::post("http://example.com/payments/webhook")
            .add_header("stripe-signature", SIGNATURE, true)
            .raw_json(PAYLOAD)
            .send(&make_service(expect_reconcile(Ok(ReconcileOutcome::Applied))))
            .await;

        let body: WebhookReceivedResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.received, "expected received flag");
        assert_eq!(body.outcome, "applied");

        Ok(())
    }

    #[tokio::test]
    async fn test_webhook_unknown_reference_is_still_acknowledged() -> TestResult {
        let mut res = TestClient::post("http://example.com/payments/webhook")
            .add_header("stripe-signature", SIGNATURE, true)
            .raw_json(PAYLOAD)
            .send(&make_service(expect_reconcile(Ok(
                ReconcileOutcome::UnknownReference,
            ))))
            .await;

        let body: WebhookReceivedResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.outcome, "unknown_reference");

        Ok(())
    }

    #[tokio::test]
    async fn test_webhook_invalid_signature_returns_400() {
        let res = TestClient::post("http://example.com/payments/webhook")
            .add_header("stripe-signature", SIGNATURE, true)
            .raw_json(PAYLOAD)
            .send(&make_service(expect_reconcile(Err(
                PaymentsServiceError::InvalidSignature,
            ))))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_webhook_without_signature_header_is_passed_empty() {
        let mut payments = MockPaymentsService::new();

        payments
            .expect_reconcile()
            .once()
            .withf(|_, signature| signature.is_empty())
            .return_once(|_, _| Err(PaymentsServiceError::InvalidSignature));

        payments.expect_create_intent().never();

        let res = TestClient::post("http://example.com/payments/webhook")
            .raw_json(PAYLOAD)
            .send(&make_service(payments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_webhook_deadline_asks_provider_to_retry() {
        let res = TestClient::post("http://example.com/payments/webhook")
            .add_header("stripe-signature", SIGNATURE, true)
            .raw_json(PAYLOAD)
            .send(&make_service(expect_reconcile(Err(
                PaymentsServiceError::Deadline(DeadlineExceeded(Duration::from_secs(5))),
            ))))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));
    }
}
