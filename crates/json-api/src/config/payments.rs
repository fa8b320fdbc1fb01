//! Payments Config

use clap::Args;

/// Payment provider settings.
#[derive(Debug, Args)]
pub struct PaymentsConfig {
    /// Stripe REST API base URL.
    #[arg(long, env = "STRIPE_API_BASE", default_value = "https://api.stripe.com")]
    pub stripe_api_base: String,

    /// Stripe secret API key.
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    pub stripe_secret_key: String,

    /// Stripe webhook signing secret.
    #[arg(long, env = "STRIPE_WEBHOOK_SECRET", hide_env_values = true)]
    pub stripe_webhook_secret: String,

    /// Maximum age of a signed webhook, in seconds.
    #[arg(long, env = "STRIPE_SIGNATURE_TOLERANCE_SECONDS", default_value_t = 300_u64)]
    pub stripe_signature_tolerance_seconds: u64,

    /// Timeout for calls to the Stripe API, in seconds.
    #[arg(long, env = "STRIPE_REQUEST_TIMEOUT_SECONDS", default_value_t = 10_u64)]
    pub stripe_request_timeout_seconds: u64,
}
