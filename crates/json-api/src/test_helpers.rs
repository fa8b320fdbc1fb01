//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use checkout_app::{
    context::AppContext,
    domain::{
        checkout::MockCheckoutService,
        orders::{
            MockOrdersService,
            records::{OrderLineRecord, OrderLineUuid, OrderRecord, OrderUuid},
            status::OrderStatus,
        },
        payments::{
            MockPaymentsService,
            records::{PaymentRecord, PaymentStatus, PaymentUuid},
        },
        products::records::ProductUuid,
    },
};

use crate::state::State;

pub(crate) fn strict_checkout_mock() -> MockCheckoutService {
    let mut checkout = MockCheckoutService::new();

    checkout.expect_create_order().never();

    checkout
}

pub(crate) fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_get_order().never();
    orders.expect_update_status().never();

    orders
}

pub(crate) fn strict_payments_mock() -> MockPaymentsService {
    let mut payments = MockPaymentsService::new();

    payments.expect_create_intent().never();
    payments.expect_reconcile().never();

    payments
}

fn service(app: AppContext, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(State::from_app_context(app)))
            .push(route),
    )
}

pub(crate) fn checkout_service(checkout: MockCheckoutService, route: Router) -> Service {
    service(
        AppContext {
            checkout: Arc::new(checkout),
            orders: Arc::new(strict_orders_mock()),
            payments: Arc::new(strict_payments_mock()),
        },
        route,
    )
}

pub(crate) fn orders_service(orders: MockOrdersService, route: Router) -> Service {
    service(
        AppContext {
            checkout: Arc::new(strict_checkout_mock()),
            orders: Arc::new(orders),
            payments: Arc::new(strict_payments_mock()),
        },
        route,
    )
}

pub(crate) fn payments_service(payments: MockPaymentsService, route: Router) -> Service {
    service(
        AppContext {
            checkout: Arc::new(strict_checkout_mock()),
            orders: Arc::new(strict_orders_mock()),
            payments: Arc::new(payments),
        },
        route,
    )
}

/// A pending two-unit order of one 1500-cent product, shipped at the flat fee.
pub(crate) fn make_order(uuid: OrderUuid) -> OrderRecord {
    OrderRecord {
        uuid,
        user_uuid: None,
        customer_email: "buyer@example.com".to_string(),
        status: OrderStatus::Pending,
        subtotal: 3000,
        shipping: 500,
        total: 3500,
        currency: "usd".to_string(),
        lines: vec![OrderLineRecord {
            uuid: OrderLineUuid::new(),
            order_uuid: uuid,
            position: 0,
            product_uuid: ProductUuid::new(),
            name_snapshot: "Canvas Tote".to_string(),
            price_snapshot: 1500,
            quantity: 2,
            created_at: Timestamp::UNIX_EPOCH,
        }],
        payments: Vec::new(),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_payment(order: &OrderRecord, provider_ref: &str) -> PaymentRecord {
    PaymentRecord {
        uuid: PaymentUuid::new(),
        order_uuid: order.uuid,
        provider: "stripe".to_string(),
        provider_ref: provider_ref.to_string(),
        status: PaymentStatus::Pending,
        amount: order.total,
        currency: order.currency.clone(),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
