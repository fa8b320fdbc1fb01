//! Payments Data

use crate::domain::payments::records::PaymentRecord;

/// A stored payment plus the secret the client needs to confirm it.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedIntent {
    pub payment: PaymentRecord,
    pub client_secret: String,
}

/// What a verified webhook event did. Every variant is acknowledged to the
/// provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Payment and order both moved.
    Applied,

    /// The order was already `paid` or `failed`.
    AlreadySettled,

    /// No payment carries the event's provider reference.
    UnknownReference,

    /// The event's order metadata disagrees with the stored payment.
    OrderMismatch,

    /// The order has left `pending` administratively; only the payment moved.
    OrderNotPending,

    /// The event type does not drive orders.
    Ignored,
}

impl ReconcileOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::AlreadySettled => "already_settled",
            Self::UnknownReference => "unknown_reference",
            Self::OrderMismatch => "order_mismatch",
            Self::OrderNotPending => "order_not_pending",
            Self::Ignored => "ignored",
        }
    }
}
