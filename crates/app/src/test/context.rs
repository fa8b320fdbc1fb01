//! Test context for service-level integration tests.

use std::sync::Arc;

use crate::{
    database::Db,
    domain::{
        checkout::PgCheckoutService, orders::PgOrdersService, orders::totals::ShippingPolicy,
        payments::PgPaymentsService,
    },
};

use super::{db::TestDb, provider::TestProvider};

pub struct TestContext {
    pub db: TestDb,
    pub checkout: PgCheckoutService,
    pub orders: PgOrdersService,
    pub payments: PgPaymentsService,
}

impl TestContext {
    pub async fn new() -> Self {
        let db = TestDb::new().await;
        let services_db = Db::new(db.pool().clone());

        Self {
            checkout: PgCheckoutService::new(services_db.clone(), ShippingPolicy::default()),
            orders: PgOrdersService::new(services_db.clone()),
            payments: PgPaymentsService::new(services_db, Arc::new(TestProvider::default())),
            db,
        }
    }
}
