//! Payment provider adapter.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::domain::orders::records::OrderUuid;

/// Request for a provider-side payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRequest {
    pub amount: u64,
    pub currency: String,
    pub order: OrderUuid,
}

/// A provider-side payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Provider reference used to correlate later events.
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    PaymentSucceeded,
    PaymentFailed,
    /// Any verified event type that does not drive an order.
    Other(String),
}

/// A verified provider event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEvent {
    pub id: String,
    pub kind: EventKind,
    /// Provider reference of the payment intent the event is about.
    pub payment_intent_id: Option<String>,
    /// The order the intent was created for, as recorded in its metadata.
    pub order_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid webhook signature")]
    InvalidSignature,

    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error("payment provider unreachable")]
    Transport(#[from] reqwest::Error),

    #[error("payment provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected payment provider response")]
    InvalidResponse,
}

#[automock]
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Name stored on payment rows; scopes provider references.
    fn name(&self) -> &'static str;

    /// Create a provider-side intent for exactly `request.amount`.
    async fn create_intent(&self, request: IntentRequest) -> Result<PaymentIntent, ProviderError>;

    /// Authenticate `payload` against `signature` before decoding any of it.
    fn verify_and_parse_event(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProviderEvent, ProviderError>;
}
