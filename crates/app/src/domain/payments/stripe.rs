//! Stripe payment intents over the REST API.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    time::Duration,
};

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use jiff::Timestamp;
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::domain::payments::provider::{
    EventKind, IntentRequest, PaymentIntent, PaymentProvider, ProviderError, ProviderEvent,
};

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

const PROVIDER_NAME: &str = "stripe";

const PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";
const PAYMENT_FAILED: &str = "payment_intent.payment_failed";

#[derive(Clone)]
pub struct StripeConfig {
    pub api_base: String,
    pub secret_key: Zeroizing<String>,
    pub webhook_secret: Zeroizing<String>,
    /// Maximum age of a signed webhook timestamp.
    pub signature_tolerance: Duration,
    pub request_timeout: Duration,
}

impl StripeConfig {
    pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

    #[must_use]
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_base: Self::DEFAULT_API_BASE.to_string(),
            secret_key: Zeroizing::new(secret_key.into()),
            webhook_secret: Zeroizing::new(webhook_secret.into()),
            signature_tolerance: Duration::from_secs(300),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl Debug for StripeConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("StripeConfig")
            .field("api_base", &self.api_base)
            .field("secret_key", &"[redacted]")
            .field("webhook_secret", &"[redacted]")
            .field("signature_tolerance", &self.signature_tolerance)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    config: StripeConfig,
    http: reqwest::Client,
}

impl StripeClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StripeConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { config, http })
    }
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[async_trait]
impl PaymentProvider for StripeClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn create_intent(&self, request: IntentRequest) -> Result<PaymentIntent, ProviderError> {
        let url = format!(
            "{}/v1/payment_intents",
            self.config.api_base.trim_end_matches('/')
        );

        let form = [
            ("amount", request.amount.to_string()),
            ("currency", request.currency.to_lowercase()),
            ("metadata[order_id]", request.order.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];

        let response = self
            .http
            .post(url)
            .basic_auth(self.config.secret_key.as_str(), None::<&str>)
            .form(&form)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

            warn!(status = status.as_u16(), %message, order_uuid = %request.order, "payment intent rejected");

            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: IntentResponse = response
            .json()
            .await
            .map_err(|_| ProviderError::InvalidResponse)?;

        let client_secret = body.client_secret.ok_or(ProviderError::InvalidResponse)?;

        debug!(provider_ref = %body.id, order_uuid = %request.order, "payment intent created");

        Ok(PaymentIntent {
            id: body.id,
            client_secret,
        })
    }

    fn verify_and_parse_event(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProviderEvent, ProviderError> {
        verify_signature(
            payload,
            signature,
            &self.config.webhook_secret,
            self.config.signature_tolerance,
            Timestamp::now(),
        )?;

        parse_event(payload)
    }
}

fn signing_mac(
    secret: &str,
    timestamp: &str,
    payload: &[u8],
) -> Result<Hmac<Sha256>, ProviderError> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|_| ProviderError::InvalidSignature)?;

    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    Ok(mac)
}

/// Check a `t=...,v1=...` signature header against `payload`.
///
/// Any `v1` entry may match, which lets the provider roll secrets. Every
/// failure reports the same error.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidSignature`] if the header is malformed, no
/// signature matches, or the timestamp is outside `tolerance` of `now`.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: Duration,
    now: Timestamp,
) -> Result<(), ProviderError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let part = part.trim();

        if let Some(t) = part.strip_prefix("t=") {
            timestamp = Some(t);
        } else if let Some(v1) = part.strip_prefix("v1=") {
            signatures.push(v1);
        }
    }

    let timestamp = timestamp.ok_or(ProviderError::InvalidSignature)?;

    if signatures.is_empty() {
        return Err(ProviderError::InvalidSignature);
    }

    let signed_at: i64 = timestamp
        .parse()
        .map_err(|_| ProviderError::InvalidSignature)?;

    if now.as_second().abs_diff(signed_at) > tolerance.as_secs() {
        return Err(ProviderError::InvalidSignature);
    }

    let mac = signing_mac(secret, timestamp, payload)?;

    let matched = signatures.into_iter().any(|signature| {
        hex::decode(signature).is_ok_and(|bytes| mac.clone().verify_slice(&bytes).is_ok())
    });

    if matched {
        Ok(())
    } else {
        Err(ProviderError::InvalidSignature)
    }
}

/// Build the signature header the provider would send for `payload`.
///
/// # Errors
///
/// Returns an error if `secret` cannot key the MAC.
pub fn signature_header(
    payload: &[u8],
    secret: &str,
    signed_at: Timestamp,
) -> Result<String, ProviderError> {
    let timestamp = signed_at.as_second().to_string();
    let signature = hex::encode(signing_mac(secret, &timestamp, payload)?.finalize().into_bytes());

    Ok(format!("t={timestamp},v1={signature}"))
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

/// Decode an already verified event payload.
///
/// Only `id` and `type` are required. A missing or oddly shaped `data.object`
/// leaves the references empty, so the event is acknowledged without effect.
///
/// # Errors
///
/// Returns [`ProviderError::MalformedPayload`] if the payload is not an event.
pub fn parse_event(payload: &[u8]) -> Result<ProviderEvent, ProviderError> {
    let raw: RawEvent = serde_json::from_slice(payload)
        .map_err(|e| ProviderError::MalformedPayload(e.to_string()))?;

    let kind = match raw.kind.as_str() {
        PAYMENT_SUCCEEDED => EventKind::PaymentSucceeded,
        PAYMENT_FAILED => EventKind::PaymentFailed,
        _ => EventKind::Other(raw.kind),
    };

    let object = raw.data.get("object");

    let payment_intent_id = object
        .and_then(|object| object.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let order_id = object
        .and_then(|object| object.get("metadata"))
        .and_then(|metadata| metadata.get("order_id"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(ProviderEvent {
        id: raw.id,
        kind,
        payment_intent_id,
        order_id,
    })
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use serde_json::json;
    use testresult::TestResult;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        sync::oneshot,
    };

    use crate::domain::orders::records::OrderUuid;

    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const TOLERANCE: Duration = Duration::from_secs(300);

    fn succeeded_payload(intent: &str, order: &str) -> Vec<u8> {
        json!({
            "id": "evt_1",
            "type": "payment_intent.succeeded",
            "data": { "object": { "id": intent, "object": "payment_intent", "metadata": { "order_id": order } } }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn accepts_correctly_signed_payload() -> TestResult {
        let now = Timestamp::now();
        let payload = succeeded_payload("pi_1", "order");
        let header = signature_header(&payload, SECRET, now)?;

        assert!(verify_signature(&payload, &header, SECRET, TOLERANCE, now).is_ok());

        Ok(())
    }

    #[test]
    fn rejects_tampered_payload() -> TestResult {
        let now = Timestamp::now();
        let header = signature_header(&succeeded_payload("pi_1", "order"), SECRET, now)?;

        let result = verify_signature(
            &succeeded_payload("pi_2", "order"),
            &header,
            SECRET,
            TOLERANCE,
            now,
        );

        assert!(matches!(result, Err(ProviderError::InvalidSignature)));

        Ok(())
    }

    #[test]
    fn rejects_signature_from_other_secret() -> TestResult {
        let now = Timestamp::now();
        let payload = succeeded_payload("pi_1", "order");
        let header = signature_header(&payload, "whsec_other", now)?;

        let result = verify_signature(&payload, &header, SECRET, TOLERANCE, now);

        assert!(matches!(result, Err(ProviderError::InvalidSignature)));

        Ok(())
    }

    #[test]
    fn rejects_stale_timestamp() -> TestResult {
        let now = Timestamp::now();
        let payload = succeeded_payload("pi_1", "order");
        let header = signature_header(&payload, SECRET, now.checked_sub(301.seconds())?)?;

        let result = verify_signature(&payload, &header, SECRET, TOLERANCE, now);

        assert!(matches!(result, Err(ProviderError::InvalidSignature)));

        Ok(())
    }

    #[test]
    fn rejects_malformed_headers() {
        let now = Timestamp::now();
        let payload = succeeded_payload("pi_1", "order");

        for header in ["", "t=123", "v1=abcd", "t=soon,v1=abcd", "t=1,v1=not-hex"] {
            let result = verify_signature(&payload, header, SECRET, TOLERANCE, now);

            assert!(
                matches!(result, Err(ProviderError::InvalidSignature)),
                "header {header:?} should be rejected"
            );
        }
    }

    #[test]
    fn any_matching_v1_entry_is_enough() -> TestResult {
        let now = Timestamp::now();
        let payload = succeeded_payload("pi_1", "order");
        let header = signature_header(&payload, SECRET, now)?;
        let (timestamp, valid) = header.split_once(',').unwrap_or_default();
        let rolled = format!("{timestamp},v1={},{valid}", "00".repeat(32));

        assert!(verify_signature(&payload, &rolled, SECRET, TOLERANCE, now).is_ok());

        Ok(())
    }

    #[test]
    fn parses_handled_event_types() -> TestResult {
        let event = parse_event(&succeeded_payload("pi_1", "order-1"))?;

        assert_eq!(event.kind, EventKind::PaymentSucceeded);
        assert_eq!(event.payment_intent_id.as_deref(), Some("pi_1"));
        assert_eq!(event.order_id.as_deref(), Some("order-1"));

        let failed = json!({
            "id": "evt_2",
            "type": "payment_intent.payment_failed",
            "data": { "object": { "id": "pi_9" } }
        });
        let event = parse_event(failed.to_string().as_bytes())?;

        assert_eq!(event.kind, EventKind::PaymentFailed);
        assert_eq!(event.payment_intent_id.as_deref(), Some("pi_9"));
        assert_eq!(event.order_id, None);

        Ok(())
    }

    #[test]
    fn unknown_event_types_are_kept_as_other() -> TestResult {
        let payload = json!({ "id": "evt_3", "type": "charge.refunded", "data": { "object": {} } });

        let event = parse_event(payload.to_string().as_bytes())?;

        assert_eq!(event.kind, EventKind::Other("charge.refunded".to_string()));
        assert_eq!(event.payment_intent_id, None);

        Ok(())
    }

    #[test]
    fn odd_metadata_leaves_references_empty() -> TestResult {
        let null_metadata = br#"{"id":"evt_1","type":"payment_intent.succeeded","data":{"object":{"id":"pi_1","metadata":null}}}"#;

        let event = parse_event(null_metadata)?;

        assert_eq!(event.kind, EventKind::PaymentSucceeded);
        assert_eq!(event.payment_intent_id.as_deref(), Some("pi_1"));
        assert_eq!(event.order_id, None);

        let string_metadata = json!({
            "id": "evt_2",
            "type": "customer.created",
            "data": { "object": { "id": "cus_1", "metadata": "oops" } }
        });

        let event = parse_event(string_metadata.to_string().as_bytes())?;

        assert_eq!(event.kind, EventKind::Other("customer.created".to_string()));
        assert_eq!(event.order_id, None);

        let numeric_order = json!({
            "id": "evt_3",
            "type": "payment_intent.succeeded",
            "data": { "object": { "id": "pi_3", "metadata": { "order_id": 42 } } }
        });

        assert_eq!(parse_event(numeric_order.to_string().as_bytes())?.order_id, None);

        Ok(())
    }

    #[test]
    fn missing_event_object_leaves_references_empty() -> TestResult {
        for payload in [
            json!({ "id": "evt_1", "type": "payment_intent.succeeded", "data": {} }),
            json!({ "id": "evt_2", "type": "payment_intent.succeeded", "data": null }),
            json!({ "id": "evt_3", "type": "payment_intent.succeeded", "data": { "object": "pi_1" } }),
        ] {
            let event = parse_event(payload.to_string().as_bytes())?;

            assert_eq!(event.payment_intent_id, None, "payload {payload}");
            assert_eq!(event.order_id, None, "payload {payload}");
        }

        Ok(())
    }

    #[test]
    fn non_event_payload_is_malformed() {
        assert!(matches!(
            parse_event(b"not json"),
            Err(ProviderError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_event(br#"{"type": "payment_intent.succeeded"}"#),
            Err(ProviderError::MalformedPayload(_))
        ));
    }

    #[test]
    fn config_debug_hides_secrets() {
        let config = StripeConfig::new("sk_test_123", "whsec_456");

        let debug = format!("{config:?}");

        assert!(!debug.contains("sk_test_123"));
        assert!(!debug.contains("whsec_456"));
    }

    /// Answer one HTTP request with `status` and `body`, handing the raw
    /// request back through the returned channel.
    async fn serve_once(status: &'static str, body: String) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (sender, receiver) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0_u8; 4096];

            loop {
                let read = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..read]);

                let text = String::from_utf8_lossy(&request).to_string();
                if let Some((head, rest)) = text.split_once("\r\n\r\n") {
                    let length = head
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);

                    if rest.len() >= length || read == 0 {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            let _ = sender.send(String::from_utf8_lossy(&request).to_string());
        });

        (format!("http://{addr}"), receiver)
    }

    fn client(api_base: String) -> StripeClient {
        let mut config = StripeConfig::new("sk_test_123", SECRET);
        config.api_base = api_base;

        StripeClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn create_intent_posts_amount_and_order_metadata() -> TestResult {
        let body = json!({ "id": "pi_123", "client_secret": "pi_123_secret_abc" }).to_string();
        let (api_base, request) = serve_once("200 OK", body).await;
        let order = OrderUuid::new();

        let intent = client(api_base)
            .create_intent(IntentRequest {
                amount: 3500,
                currency: "USD".to_string(),
                order,
            })
            .await?;

        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.client_secret, "pi_123_secret_abc");

        let request = request.await?;
        assert!(request.starts_with("POST /v1/payment_intents "));
        assert!(request.contains("amount=3500"));
        assert!(request.contains("currency=usd"));
        assert!(request.contains(&format!("metadata%5Border_id%5D={order}")));
        assert!(request.contains("automatic_payment_methods%5Benabled%5D=true"));

        Ok(())
    }

    #[tokio::test]
    async fn create_intent_surfaces_provider_rejection() {
        let body = json!({ "error": { "message": "Invalid API Key provided" } }).to_string();
        let (api_base, _request) = serve_once("401 Unauthorized", body).await;

        let result = client(api_base)
            .create_intent(IntentRequest {
                amount: 100,
                currency: "usd".to_string(),
                order: OrderUuid::new(),
            })
            .await;

        assert!(
            matches!(
                &result,
                Err(ProviderError::Rejected { status: 401, message }) if message == "Invalid API Key provided"
            ),
            "expected Rejected, got {result:?}"
        );
    }

    #[tokio::test]
    async fn create_intent_without_client_secret_is_invalid() {
        let (api_base, _request) = serve_once("200 OK", json!({ "id": "pi_1" }).to_string()).await;

        let result = client(api_base)
            .create_intent(IntentRequest {
                amount: 100,
                currency: "usd".to_string(),
                order: OrderUuid::new(),
            })
            .await;

        assert!(matches!(result, Err(ProviderError::InvalidResponse)));
    }
}
