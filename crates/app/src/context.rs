//! App Context

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tracing::info;

use crate::{
    database::{self, DatabaseOptions, Db},
    domain::{
        checkout::{CheckoutService, PgCheckoutService},
        orders::{OrdersService, PgOrdersService, totals::ShippingPolicy},
        payments::{
            PaymentsService, PgPaymentsService,
            provider::ProviderError,
            stripe::{StripeClient, StripeConfig},
        },
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),

    #[error("failed to build payment provider client")]
    Provider(#[source] ProviderError),
}

/// Everything needed to assemble the services.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub database: DatabaseOptions,
    /// Apply pending migrations right after connecting.
    pub run_migrations: bool,
    pub unit_of_work_timeout: Duration,
    pub shipping: ShippingPolicy,
    pub stripe: StripeConfig,
}

#[derive(Clone)]
pub struct AppContext {
    pub checkout: Arc<dyn CheckoutService>,
    pub orders: Arc<dyn OrdersService>,
    pub payments: Arc<dyn PaymentsService>,
}

impl AppContext {
    /// Connect to the database and build every service.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails, a
    /// requested migration fails, or the provider client cannot be built.
    pub async fn from_settings(settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(&settings.database)
            .await
            .map_err(AppInitError::Database)?;

        if settings.run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;

            info!("migrations applied");
        }

        let db = Db::new(pool).with_timeout(settings.unit_of_work_timeout);

        let provider = StripeClient::new(settings.stripe).map_err(AppInitError::Provider)?;

        Ok(Self {
            checkout: Arc::new(PgCheckoutService::new(db.clone(), settings.shipping)),
            orders: Arc::new(PgOrdersService::new(db.clone())),
            payments: Arc::new(PgPaymentsService::new(db, Arc::new(provider))),
        })
    }
}
