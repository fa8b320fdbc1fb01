//! Test Helpers

use jiff::Timestamp;
use serde_json::json;
use sqlx::{query, query_scalar};

use crate::{
    domain::{
        checkout::{
            CheckoutService, CheckoutServiceError,
            data::{CheckoutLine, NewCheckout},
        },
        orders::{
            records::{OrderRecord, OrderUuid},
            status::OrderStatus,
        },
        payments::{provider::ProviderError, stripe::signature_header},
        products::records::ProductUuid,
    },
    test::{TestContext, WEBHOOK_SECRET},
};

pub(crate) async fn create_product(
    ctx: &TestContext,
    name: &str,
    price: i64,
    stock: i64,
) -> Result<ProductUuid, sqlx::Error> {
    let product = ProductUuid::new();

    query("INSERT INTO products (uuid, name, price, stock) VALUES ($1, $2, $3, $4)")
        .bind(product.into_uuid())
        .bind(name)
        .bind(price)
        .bind(stock)
        .execute(ctx.db.pool())
        .await?;

    Ok(product)
}

pub(crate) async fn deactivate_product(
    ctx: &TestContext,
    product: ProductUuid,
) -> Result<(), sqlx::Error> {
    query("UPDATE products SET is_active = FALSE WHERE uuid = $1")
        .bind(product.into_uuid())
        .execute(ctx.db.pool())
        .await?;

    Ok(())
}

pub(crate) async fn set_price(
    ctx: &TestContext,
    product: ProductUuid,
    price: i64,
) -> Result<(), sqlx::Error> {
    query("UPDATE products SET price = $2, name = name || ' (updated)' WHERE uuid = $1")
        .bind(product.into_uuid())
        .bind(price)
        .execute(ctx.db.pool())
        .await?;

    Ok(())
}

pub(crate) async fn set_currency(
    ctx: &TestContext,
    product: ProductUuid,
    currency: &str,
) -> Result<(), sqlx::Error> {
    query("UPDATE products SET currency = $2 WHERE uuid = $1")
        .bind(product.into_uuid())
        .bind(currency)
        .execute(ctx.db.pool())
        .await?;

    Ok(())
}

pub(crate) async fn product_stock(
    ctx: &TestContext,
    product: ProductUuid,
) -> Result<i64, sqlx::Error> {
    query_scalar("SELECT stock FROM products WHERE uuid = $1")
        .bind(product.into_uuid())
        .fetch_one(ctx.db.pool())
        .await
}

pub(crate) async fn order_count(ctx: &TestContext) -> Result<i64, sqlx::Error> {
    query_scalar("SELECT count(*) FROM orders")
        .fetch_one(ctx.db.pool())
        .await
}

pub(crate) async fn payment_count(ctx: &TestContext) -> Result<i64, sqlx::Error> {
    query_scalar("SELECT count(*) FROM payments")
        .fetch_one(ctx.db.pool())
        .await
}

/// Set an order's status directly, bypassing the lifecycle rules.
pub(crate) async fn force_status(
    ctx: &TestContext,
    order: OrderUuid,
    status: OrderStatus,
) -> Result<(), sqlx::Error> {
    query("UPDATE orders SET status = $2 WHERE uuid = $1")
        .bind(order.into_uuid())
        .bind(status.as_str())
        .execute(ctx.db.pool())
        .await?;

    Ok(())
}

pub(crate) async fn checkout(
    ctx: &TestContext,
    lines: &[(ProductUuid, u32)],
) -> Result<OrderRecord, CheckoutServiceError> {
    ctx.checkout
        .create_order(NewCheckout {
            customer_email: "buyer@example.com".to_string(),
            user_uuid: None,
            lines: lines
                .iter()
                .map(|&(product, quantity)| CheckoutLine { product, quantity })
                .collect(),
        })
        .await
}

/// Sign `payload` with the test webhook secret.
pub(crate) fn sign(payload: Vec<u8>) -> Result<(Vec<u8>, String), ProviderError> {
    let header = signature_header(&payload, WEBHOOK_SECRET, Timestamp::now())?;

    Ok((payload, header))
}

/// A signed payment intent event.
pub(crate) fn signed_event(
    kind: &str,
    payment_intent: &str,
    order: Option<OrderUuid>,
) -> Result<(Vec<u8>, String), ProviderError> {
    let metadata = order.map_or_else(|| json!({}), |order| json!({ "order_id": order.to_string() }));

    let payload = json!({
        "id": format!("evt_{payment_intent}"),
        "object": "event",
        "type": kind,
        "data": {
            "object": {
                "id": payment_intent,
                "object": "payment_intent",
                "metadata": metadata,
            }
        }
    });

    sign(payload.to_string().into_bytes())
}
