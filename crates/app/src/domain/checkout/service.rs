//! Checkout service.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::{
        checkout::{
            data::{CheckoutLine, NewCheckout},
            errors::CheckoutServiceError,
        },
        inventory::PgInventoryLedger,
        orders::{
            data::{NewOrder, NewOrderLine},
            records::{OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
            totals::{OrderTotals, ShippingPolicy},
        },
        pricing::PriceSnapshot,
        products::records::ProductUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCheckoutService {
    db: Db,
    ledger: PgInventoryLedger,
    orders_repository: PgOrdersRepository,
    shipping: ShippingPolicy,
}

impl PgCheckoutService {
    #[must_use]
    pub fn new(db: Db, shipping: ShippingPolicy) -> Self {
        Self {
            db,
            ledger: PgInventoryLedger::new(),
            orders_repository: PgOrdersRepository::new(),
            shipping,
        }
    }
}

/// Largest quantity an order line can hold.
const MAX_LINE_QUANTITY: u32 = i32::MAX.unsigned_abs();

/// Total quantity per product, in ascending product order.
///
/// Every checkout takes product locks in this order, so two checkouts over
/// overlapping products always queue on the same row first.
fn lock_plan(lines: &[CheckoutLine]) -> Result<BTreeMap<ProductUuid, u64>, CheckoutServiceError> {
    let mut plan = BTreeMap::new();

    for line in lines {
        if line.quantity == 0 {
            return Err(CheckoutServiceError::InvalidQuantity(line.product));
        }

        if line.quantity > MAX_LINE_QUANTITY {
            return Err(CheckoutServiceError::QuantityTooLarge(line.product));
        }

        *plan.entry(line.product).or_insert(0_u64) += u64::from(line.quantity);
    }

    Ok(plan)
}

fn validate(checkout: &NewCheckout) -> Result<(), CheckoutServiceError> {
    if checkout.customer_email.trim().is_empty() {
        return Err(CheckoutServiceError::MissingEmail);
    }

    if checkout.lines.is_empty() {
        return Err(CheckoutServiceError::EmptyCart);
    }

    Ok(())
}

/// The single currency shared by every snapshot.
fn order_currency(lines: &[NewOrderLine]) -> Result<String, CheckoutServiceError> {
    let mut currencies = lines.iter().map(|line| line.snapshot.currency.as_str());

    let first = currencies.next().ok_or(CheckoutServiceError::EmptyCart)?;

    if currencies.any(|currency| currency != first) {
        return Err(CheckoutServiceError::MixedCurrency);
    }

    Ok(first.to_string())
}

#[async_trait]
impl CheckoutService for PgCheckoutService {
    async fn create_order(
        &self,
        checkout: NewCheckout,
    ) -> Result<OrderRecord, CheckoutServiceError> {
        validate(&checkout)?;

        let plan = lock_plan(&checkout.lines)?;

        self.db
            .within_deadline(async {
                let mut tx = self.db.begin().await?;

                let mut snapshots: HashMap<ProductUuid, PriceSnapshot> =
                    HashMap::with_capacity(plan.len());

                for (&product, &quantity) in &plan {
                    let reservation = self.ledger.reserve(&mut tx, product, quantity).await?;

                    snapshots.insert(product, reservation.snapshot());
                }

                let lines = checkout
                    .lines
                    .iter()
                    .map(|line| {
                        snapshots
                            .get(&line.product)
                            .cloned()
                            .map(|snapshot| NewOrderLine {
                                product: line.product,
                                snapshot,
                                quantity: line.quantity,
                            })
                            .ok_or(CheckoutServiceError::ProductNotFound(line.product))
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                let currency = order_currency(&lines)?;
                let totals = OrderTotals::compute(&lines, &self.shipping)?;

                let new_order = NewOrder {
                    uuid: OrderUuid::new(),
                    user_uuid: checkout.user_uuid,
                    customer_email: checkout.customer_email.trim().to_string(),
                    currency,
                    totals,
                };

                let mut order = self
                    .orders_repository
                    .create_order(&mut tx, &new_order)
                    .await?;

                order.lines = self
                    .orders_repository
                    .create_order_lines(&mut tx, order.uuid, &lines)
                    .await?;

                tx.commit().await?;

                debug!(order_uuid = %order.uuid, products = plan.len(), "reserved checkout stock");
                info!(
                    order_uuid = %order.uuid,
                    total = order.total,
                    currency = %order.currency,
                    "order created"
                );

                Ok::<_, CheckoutServiceError>(order)
            })
            .await
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Reserve stock, snapshot prices and persist a pending order, all in one
    /// transaction.
    async fn create_order(&self, checkout: NewCheckout)
    -> Result<OrderRecord, CheckoutServiceError>;
}
