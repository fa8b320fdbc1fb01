//! Payments service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info, warn};

use crate::{
    database::Db,
    domain::{
        orders::{
            records::{OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
            status::{OrderStatus, PaymentOutcome, Transition},
        },
        payments::{
            data::{CreatedIntent, ReconcileOutcome},
            errors::PaymentsServiceError,
            provider::{EventKind, IntentRequest, PaymentProvider},
            records::{NewPayment, PaymentStatus, PaymentUuid},
            repository::PgPaymentsRepository,
        },
    },
};

#[derive(Clone)]
pub struct PgPaymentsService {
    db: Db,
    provider: Arc<dyn PaymentProvider>,
    payments_repository: PgPaymentsRepository,
    orders_repository: PgOrdersRepository,
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db, provider: Arc<dyn PaymentProvider>) -> Self {
        Self {
            db,
            provider,
            payments_repository: PgPaymentsRepository::new(),
            orders_repository: PgOrdersRepository::new(),
        }
    }

    async fn pending_order(&self, order: OrderUuid) -> Result<OrderRecord, PaymentsServiceError> {
        let record = self
            .db
            .within_deadline(async {
                let mut tx = self.db.begin().await?;
                let record = self.orders_repository.get_order(&mut tx, order).await?;
                tx.commit().await?;

                Ok::<_, PaymentsServiceError>(record)
            })
            .await?;

        if record.status != OrderStatus::Pending {
            return Err(PaymentsServiceError::OrderNotPending(record.status));
        }

        Ok(record)
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    async fn create_intent(&self, order: OrderUuid) -> Result<CreatedIntent, PaymentsServiceError> {
        let record = self.pending_order(order).await?;

        // No transaction is held while the provider is called.
        let intent = self
            .provider
            .create_intent(IntentRequest {
                amount: record.total,
                currency: record.currency.clone(),
                order,
            })
            .await?;

        self.db
            .within_deadline(async {
                let mut tx = self.db.begin().await?;

                let locked = self.orders_repository.lock_order(&mut tx, order).await?;

                if locked.status != OrderStatus::Pending {
                    warn!(
                        order_uuid = %order,
                        provider_ref = %intent.id,
                        status = %locked.status,
                        "order left pending while intent was created"
                    );

                    return Err(PaymentsServiceError::OrderNotPending(locked.status));
                }

                let payment = self
                    .payments_repository
                    .create_payment(
                        &mut tx,
                        &NewPayment {
                            uuid: PaymentUuid::new(),
                            order_uuid: order,
                            provider: self.provider.name().to_string(),
                            provider_ref: intent.id.clone(),
                            amount: locked.total,
                            currency: locked.currency.clone(),
                        },
                    )
                    .await?;

                tx.commit().await?;

                info!(
                    order_uuid = %order,
                    payment_uuid = %payment.uuid,
                    provider_ref = %payment.provider_ref,
                    amount = payment.amount,
                    "payment intent recorded"
                );

                Ok::<_, PaymentsServiceError>(CreatedIntent {
                    payment,
                    client_secret: intent.client_secret.clone(),
                })
            })
            .await
    }

    async fn reconcile(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ReconcileOutcome, PaymentsServiceError> {
        let event = self.provider.verify_and_parse_event(payload, signature)?;

        let outcome = match &event.kind {
            EventKind::PaymentSucceeded => PaymentOutcome::Succeeded,
            EventKind::PaymentFailed => PaymentOutcome::Failed,
            EventKind::Other(kind) => {
                debug!(event_id = %event.id, event_type = %kind, "ignoring webhook event");

                return Ok(ReconcileOutcome::Ignored);
            }
        };

        let Some(provider_ref) = event.payment_intent_id.as_deref() else {
            warn!(event_id = %event.id, "webhook event has no payment intent");

            return Ok(ReconcileOutcome::UnknownReference);
        };

        let result = self
            .db
            .within_deadline(async {
                let mut tx = self.db.begin().await?;

                let Some(payment) = self
                    .payments_repository
                    .lock_payment_by_ref(&mut tx, self.provider.name(), provider_ref)
                    .await?
                else {
                    return Ok(ReconcileOutcome::UnknownReference);
                };

                if event
                    .order_id
                    .as_deref()
                    .is_some_and(|order_id| order_id != payment.order_uuid.to_string())
                {
                    return Ok(ReconcileOutcome::OrderMismatch);
                }

                let order = self
                    .orders_repository
                    .lock_order(&mut tx, payment.order_uuid)
                    .await?;

                let settled = self
                    .payments_repository
                    .settle_payment(&mut tx, payment.uuid, PaymentStatus::from(outcome))
                    .await?;

                if settled.is_none() {
                    return Ok(ReconcileOutcome::AlreadySettled);
                }

                let result = match order.status.settle(outcome) {
                    Transition::Apply(next) => {
                        self.orders_repository
                            .update_order_status(&mut tx, order.uuid, next)
                            .await?;

                        ReconcileOutcome::Applied
                    }
                    Transition::AlreadySettled => ReconcileOutcome::AlreadySettled,
                    Transition::NotPending(_) => ReconcileOutcome::OrderNotPending,
                };

                tx.commit().await?;

                Ok::<_, PaymentsServiceError>(result)
            })
            .await?;

        info!(
            event_id = %event.id,
            provider_ref,
            outcome = result.as_str(),
            "payment event reconciled"
        );

        Ok(result)
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Create a provider intent for a pending order and record it as a
    /// pending payment.
    async fn create_intent(&self, order: OrderUuid) -> Result<CreatedIntent, PaymentsServiceError>;

    /// Verify a webhook delivery and apply it to the matching payment and
    /// order.
    async fn reconcile(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ReconcileOutcome, PaymentsServiceError>;
}
