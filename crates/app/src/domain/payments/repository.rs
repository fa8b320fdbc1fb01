//! Payments Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::{
    orders::records::OrderUuid,
    payments::records::{NewPayment, PaymentRecord, PaymentStatus, PaymentUuid},
    products::repository::{to_i64, try_get_amount},
};

const CREATE_PAYMENT_SQL: &str = include_str!("sql/create_payment.sql");
const LOCK_PAYMENT_BY_REF_SQL: &str = include_str!("sql/lock_payment_by_ref.sql");
const SETTLE_PAYMENT_SQL: &str = include_str!("sql/settle_payment.sql");
const GET_ORDER_PAYMENTS_SQL: &str = include_str!("sql/get_order_payments.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: &NewPayment,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(CREATE_PAYMENT_SQL)
            .bind(payment.uuid.into_uuid())
            .bind(payment.order_uuid.into_uuid())
            .bind(&payment.provider)
            .bind(&payment.provider_ref)
            .bind(to_i64(payment.amount, "amount")?)
            .bind(&payment.currency)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a payment by its provider reference and hold its row lock.
    pub(crate) async fn lock_payment_by_ref(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        provider: &str,
        provider_ref: &str,
    ) -> Result<Option<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LOCK_PAYMENT_BY_REF_SQL)
            .bind(provider)
            .bind(provider_ref)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Move a pending payment to `status`.
    ///
    /// Returns `None` if the payment had already left `pending`.
    pub(crate) async fn settle_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        status: PaymentStatus,
    ) -> Result<Option<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(SETTLE_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .bind(status.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(GET_ORDER_PAYMENTS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for PaymentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            provider: row.try_get("provider")?,
            provider_ref: row.try_get("provider_ref")?,
            status: status.parse().map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?,
            amount: try_get_amount(row, "amount")?,
            currency: row.try_get("currency")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
