//! Order totals.

use thiserror::Error;

use crate::domain::orders::data::NewOrderLine;

/// Flat-rate shipping waived at or above a subtotal threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    pub flat_fee: u64,
    pub free_threshold: u64,
}

impl ShippingPolicy {
    #[must_use]
    pub const fn shipping_for(&self, subtotal: u64) -> u64 {
        if subtotal < self.free_threshold {
            self.flat_fee
        } else {
            0
        }
    }
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            flat_fee: 500,
            free_threshold: 5000,
        }
    }
}

/// Largest amount an order column can hold.
pub const MAX_AMOUNT: u64 = i64::MAX.unsigned_abs();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("order total overflows")]
pub struct TotalsOverflow;

/// Amounts fixed on an order when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: u64,
    pub shipping: u64,
    pub total: u64,
}

impl OrderTotals {
    /// Sum the snapshot lines and apply the shipping policy.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsOverflow`] if the total exceeds [`MAX_AMOUNT`].
    pub fn compute<'a>(
        lines: impl IntoIterator<Item = &'a NewOrderLine>,
        policy: &ShippingPolicy,
    ) -> Result<Self, TotalsOverflow> {
        let subtotal = lines.into_iter().try_fold(0_u64, |acc, line| {
            line.snapshot
                .line_total(line.quantity)
                .and_then(|amount| acc.checked_add(amount))
                .ok_or(TotalsOverflow)
        })?;

        let shipping = policy.shipping_for(subtotal);
        let total = subtotal
            .checked_add(shipping)
            .filter(|&total| total <= MAX_AMOUNT)
            .ok_or(TotalsOverflow)?;

        Ok(Self {
            subtotal,
            shipping,
            total,
        })
    }
}
