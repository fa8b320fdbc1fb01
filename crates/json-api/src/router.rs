//! App Router

use salvo::Router;

use crate::{checkout, orders, payments};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("checkout").post(checkout::create::handler))
        .push(Router::with_path("orders/{order}").get(orders::get::handler))
        .push(Router::with_path("admin/orders/{order}/status").put(orders::update_status::handler))
        .push(
            Router::with_path("payments")
                .push(Router::with_path("intents").post(payments::create_intent::handler))
                .push(Router::with_path("webhook").post(payments::webhook::handler)),
        )
}
