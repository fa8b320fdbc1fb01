//! Checkout Config

use clap::Args;

/// Checkout pricing settings, in minor currency units.
#[derive(Debug, Args)]
pub struct CheckoutConfig {
    /// Shipping charged on orders below the free-shipping threshold.
    #[arg(long, env = "SHIPPING_FLAT_FEE", default_value_t = 500_u64)]
    pub shipping_flat_fee: u64,

    /// Subtotal at or above which shipping is free.
    #[arg(long, env = "SHIPPING_FREE_THRESHOLD", default_value_t = 5_000_u64)]
    pub shipping_free_threshold: u64,
}
