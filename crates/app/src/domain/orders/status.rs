//! Order lifecycle.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Failed,
}

/// What a verified payment event says happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded,
    Failed,
}

/// Result of applying a payment outcome to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move the order to the given status.
    Apply(OrderStatus),

    /// The order already reached `paid` or `failed`; nothing to do.
    AlreadySettled,

    /// The order has moved on administratively and payment events no longer
    /// drive it.
    NotPending(OrderStatus),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid order status: {0:?}")]
pub struct InvalidStatus(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move order from {from} to {to}")]
pub struct IllegalTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl OrderStatus {
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Paid,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Failed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// Position along the fulfilment path. `cancelled` and `failed` sit off it.
    const fn stage(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Paid => Some(1),
            Self::Processing => Some(2),
            Self::Shipped => Some(3),
            Self::Delivered => Some(4),
            Self::Cancelled | Self::Failed => None,
        }
    }

    /// Apply a verified payment outcome.
    ///
    /// Only `pending` orders move. Orders already `paid` or `failed` report
    /// [`Transition::AlreadySettled`] so redelivered events are harmless.
    #[must_use]
    pub const fn settle(self, outcome: PaymentOutcome) -> Transition {
        match (self, outcome) {
            (Self::Pending, PaymentOutcome::Succeeded) => Transition::Apply(Self::Paid),
            (Self::Pending, PaymentOutcome::Failed) => Transition::Apply(Self::Failed),
            (Self::Paid | Self::Failed, _) => Transition::AlreadySettled,
            (current, _) => Transition::NotPending(current),
        }
    }

    /// Validate an administrative status change.
    ///
    /// Setting the current status again is accepted. `paid` and `failed` are
    /// only ever reached through payment events, `pending` only through
    /// checkout. `cancelled` is reachable from every state and is final.
    /// `shipped` and `delivered` are reachable from any state that is not
    /// already further along, `processing` only from `pending` or `paid`.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalTransition`] for any other move.
    pub const fn admin_transition(self, next: Self) -> Result<Self, IllegalTransition> {
        let allowed = match (self, next) {
            (current, next) if current as u8 == next as u8 => true,
            (Self::Cancelled, _) => false,
            (_, Self::Pending | Self::Paid | Self::Failed) => false,
            (_, Self::Cancelled) => true,
            (Self::Failed, next) => matches!(next, Self::Shipped | Self::Delivered),
            (current, next) => match (current.stage(), next.stage()) {
                (Some(from), Some(to)) => to > from,
                _ => false,
            },
        };

        if allowed {
            Ok(next)
        } else {
            Err(IllegalTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_allowed_status() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn rejects_unknown_status_strings() {
        assert_eq!(
            "refunded".parse::<OrderStatus>(),
            Err(InvalidStatus("refunded".to_string()))
        );
        assert!("Paid".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn pending_orders_settle_on_payment_outcome() {
        assert_eq!(
            OrderStatus::Pending.settle(PaymentOutcome::Succeeded),
            Transition::Apply(OrderStatus::Paid)
        );
        assert_eq!(
            OrderStatus::Pending.settle(PaymentOutcome::Failed),
            Transition::Apply(OrderStatus::Failed)
        );
    }

    #[test]
    fn settled_orders_ignore_repeated_outcomes() {
        for outcome in [PaymentOutcome::Succeeded, PaymentOutcome::Failed] {
            assert_eq!(OrderStatus::Paid.settle(outcome), Transition::AlreadySettled);
            assert_eq!(OrderStatus::Failed.settle(outcome), Transition::AlreadySettled);
        }
    }

    #[test]
    fn fulfilment_states_are_not_driven_by_payments() {
        assert_eq!(
            OrderStatus::Shipped.settle(PaymentOutcome::Succeeded),
            Transition::NotPending(OrderStatus::Shipped)
        );
        assert_eq!(
            OrderStatus::Cancelled.settle(PaymentOutcome::Failed),
            Transition::NotPending(OrderStatus::Cancelled)
        );
    }

    #[test]
    fn admin_moves_forward_along_fulfilment() {
        assert_eq!(
            OrderStatus::Paid.admin_transition(OrderStatus::Processing),
            Ok(OrderStatus::Processing)
        );
        assert_eq!(
            OrderStatus::Processing.admin_transition(OrderStatus::Shipped),
            Ok(OrderStatus::Shipped)
        );
        assert_eq!(
            OrderStatus::Paid.admin_transition(OrderStatus::Delivered),
            Ok(OrderStatus::Delivered)
        );
    }

    #[test]
    fn admin_cannot_move_backwards() {
        let result = OrderStatus::Shipped.admin_transition(OrderStatus::Processing);

        assert_eq!(
            result,
            Err(IllegalTransition {
                from: OrderStatus::Shipped,
                to: OrderStatus::Processing,
            })
        );
    }

    #[test]
    fn admin_cannot_set_payment_driven_states() {
        assert!(OrderStatus::Pending.admin_transition(OrderStatus::Paid).is_err());
        assert!(OrderStatus::Pending.admin_transition(OrderStatus::Failed).is_err());
        assert!(OrderStatus::Paid.admin_transition(OrderStatus::Pending).is_err());
    }

    #[test]
    fn cancelled_is_final_and_reachable_from_every_state() {
        for status in OrderStatus::ALL {
            assert_eq!(
                status.admin_transition(OrderStatus::Cancelled),
                Ok(OrderStatus::Cancelled),
                "{status} should cancel"
            );
        }

        assert!(OrderStatus::Cancelled.admin_transition(OrderStatus::Shipped).is_err());
        assert!(OrderStatus::Cancelled.admin_transition(OrderStatus::Delivered).is_err());
    }

    #[test]
    fn shipping_and_delivery_are_reachable_from_any_earlier_state() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Processing,
            OrderStatus::Failed,
        ] {
            assert_eq!(
                status.admin_transition(OrderStatus::Shipped),
                Ok(OrderStatus::Shipped)
            );
            assert_eq!(
                status.admin_transition(OrderStatus::Delivered),
                Ok(OrderStatus::Delivered)
            );
        }

        assert!(OrderStatus::Delivered.admin_transition(OrderStatus::Shipped).is_err());
    }

    #[test]
    fn failed_orders_do_not_return_to_processing() {
        assert!(OrderStatus::Failed.admin_transition(OrderStatus::Processing).is_err());
    }

    #[test]
    fn setting_the_same_status_is_accepted() {
        for status in OrderStatus::ALL {
            assert_eq!(status.admin_transition(status), Ok(status));
        }
    }
}
