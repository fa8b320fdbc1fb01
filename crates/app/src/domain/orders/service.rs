//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        orders::{
            errors::OrdersServiceError,
            records::{OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
            status::OrderStatus,
        },
        payments::repository::PgPaymentsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    orders_repository: PgOrdersRepository,
    payments_repository: PgPaymentsRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            orders_repository: PgOrdersRepository::new(),
            payments_repository: PgPaymentsRepository::new(),
        }
    }

    async fn attach_children(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut order: OrderRecord,
    ) -> Result<OrderRecord, sqlx::Error> {
        order.lines = self
            .orders_repository
            .get_order_lines(tx, order.uuid)
            .await?;

        order.payments = self
            .payments_repository
            .get_order_payments(tx, order.uuid)
            .await?;

        Ok(order)
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        self.db
            .within_deadline(async {
                let mut tx = self.db.begin().await?;

                let record = self.orders_repository.get_order(&mut tx, order).await?;
                let record = self.attach_children(&mut tx, record).await?;

                tx.commit().await?;

                Ok::<_, OrdersServiceError>(record)
            })
            .await
    }

    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        self.db
            .within_deadline(async {
                let mut tx = self.db.begin().await?;

                let current = self.orders_repository.lock_order(&mut tx, order).await?;
                let next = current.status.admin_transition(status)?;

                let record = if next == current.status {
                    current
                } else {
                    let updated = self
                        .orders_repository
                        .update_order_status(&mut tx, order, next)
                        .await?;

                    info!(
                        order_uuid = %order,
                        from = %current.status,
                        to = %next,
                        "order status updated"
                    );

                    updated
                };

                let record = self.attach_children(&mut tx, record).await?;

                tx.commit().await?;

                Ok::<_, OrdersServiceError>(record)
            })
            .await
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Retrieve an order with its lines and payment attempts.
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// Apply an administrative status change under the order's row lock.
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;
}
