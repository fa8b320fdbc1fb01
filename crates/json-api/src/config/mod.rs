//! Server configuration module

use std::time::Duration;

use checkout_app::{
    context::AppSettings,
    database::DatabaseOptions,
    domain::{orders::totals::ShippingPolicy, payments::stripe::StripeConfig},
};
use clap::Parser;

use crate::config::{
    checkout::CheckoutConfig,
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    payments::PaymentsConfig,
    server::ServerRuntimeConfig,
};

pub(crate) mod checkout;
pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod payments;
pub(crate) mod server;

/// Checkout JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "checkout-json", about = "Checkout JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Checkout pricing settings.
    #[command(flatten)]
    pub checkout: CheckoutConfig,

    /// Payment provider settings.
    #[command(flatten)]
    pub payments: PaymentsConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Settings used to assemble the application services.
    #[must_use]
    pub fn app_settings(&self) -> AppSettings {
        let database = &self.database;
        let payments = &self.payments;

        let mut stripe =
            StripeConfig::new(payments.stripe_secret_key.clone(), payments.stripe_webhook_secret.clone());

        stripe.api_base.clone_from(&payments.stripe_api_base);
        stripe.signature_tolerance = Duration::from_secs(payments.stripe_signature_tolerance_seconds);
        stripe.request_timeout = Duration::from_secs(payments.stripe_request_timeout_seconds);

        AppSettings {
            database: DatabaseOptions {
                url: database.database_url.clone(),
                max_connections: database.database_max_connections,
                min_connections: database.database_min_connections,
                acquire_timeout: Duration::from_secs(database.database_acquire_timeout_seconds),
            },
            run_migrations: database.run_migrations,
            unit_of_work_timeout: Duration::from_millis(database.unit_of_work_timeout_ms),
            shipping: ShippingPolicy {
                flat_fee: self.checkout.shipping_flat_fee,
                free_threshold: self.checkout.shipping_free_threshold,
            },
            stripe,
        }
    }
}
