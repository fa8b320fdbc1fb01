use checkout_app::{
    database::{self, DatabaseOptions, Db},
    domain::orders::{OrdersService, PgOrdersService, records::OrderUuid},
};
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct ShowOrderArgs {
    /// Order UUID
    order: OrderUuid,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ShowOrderArgs) -> Result<(), String> {
    let pool = database::connect(&DatabaseOptions::new(args.database_url))
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let order = PgOrdersService::new(Db::new(pool))
        .get_order(args.order)
        .await
        .map_err(|error| format!("failed to load order: {error}"))?;

    println!("order_uuid: {}", order.uuid);
    println!("status: {}", order.status);
    println!("customer_email: {}", order.customer_email);
    println!(
        "subtotal: {} shipping: {} total: {} {}",
        order.subtotal, order.shipping, order.total, order.currency
    );

    for line in &order.lines {
        println!(
            "line {}: {} x{} @ {} ({})",
            line.position, line.name_snapshot, line.quantity, line.price_snapshot, line.product_uuid
        );
    }

    for payment in &order.payments {
        println!(
            "payment {}: {} {} {} {}",
            payment.uuid, payment.provider, payment.provider_ref, payment.status, payment.amount
        );
    }

    Ok(())
}
