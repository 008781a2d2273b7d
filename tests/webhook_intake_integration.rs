//! Integration tests for inbound webhook handling.
//!
//! These tests drive the full inbound path:
//! 1. Secrets configuration builds the provider registry
//! 2. WebhookIntake verifies the raw body against the registered secret
//! 3. The processor dispatches to the category handler
//! 4. The idempotent processor acknowledges redeliveries without dispatch

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use serde_json::json;
use sha2::Sha256;

use commerce_gateway::adapters::InMemoryProcessedEventStore;
use commerce_gateway::application::{IntakeError, ReceiveWebhookCommand, WebhookIntake};
use commerce_gateway::config::WebhookSecretsConfig;
use commerce_gateway::domain::webhooks::{
    sign, stripe_signature_header, EventCategory, IdempotentWebhookProcessor, ProviderRegistry,
    ProviderWebhookConfig, WebhookEvent, WebhookProcessor,
};
use commerce_gateway::ports::{HandlerError, WebhookEventHandler};
use commerce_gateway::Provider;

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Handler that counts calls and optionally fails.
#[derive(Default)]
struct CountingHandler {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingHandler {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebhookEventHandler for CountingHandler {
    async fn handle(&self, _event: &WebhookEvent) -> Result<(), HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(HandlerError::failed("inventory service unavailable"));
        }
        Ok(())
    }
}

struct Handlers {
    order: Arc<CountingHandler>,
    payment: Arc<CountingHandler>,
    infrastructure: Arc<CountingHandler>,
    product: Arc<CountingHandler>,
}

impl Handlers {
    fn new() -> Self {
        Self {
            order: CountingHandler::new(),
            payment: CountingHandler::new(),
            infrastructure: CountingHandler::new(),
            product: CountingHandler::new(),
        }
    }

    fn processor(&self) -> WebhookProcessor {
        WebhookProcessor::new(
            self.order.clone(),
            self.payment.clone(),
            self.infrastructure.clone(),
            self.product.clone(),
        )
    }
}

fn secrets() -> WebhookSecretsConfig {
    let secret = |s: &str| Some(SecretString::new(s.to_string()));
    WebhookSecretsConfig {
        shopify_secret: secret("s3cr3t"),
        godaddy_secret: secret("gd_secret"),
        stripe_secret: secret("whsec_test"),
        square_secret: secret("sq_secret"),
        woocommerce_secret: secret("wc_secret"),
        stripe_tolerance_secs: Some(300),
    }
}

fn command(provider: Provider, payload: &str, signature: &str, event_type: &str) -> ReceiveWebhookCommand {
    ReceiveWebhookCommand {
        provider,
        payload: payload.as_bytes().to_vec(),
        signature: signature.to_string(),
        event: WebhookEvent::new("evt_100", provider, event_type)
            .with_raw_payload(serde_json::from_str(payload).unwrap_or(json!(null))),
    }
}

// =============================================================================
// End-to-end verification
// =============================================================================

#[tokio::test]
async fn shopify_fixture_verifies_end_to_end() {
    let registry = ProviderRegistry::new();
    registry.register(ProviderWebhookConfig::new(Provider::Shopify).with_secret("s3cr3t"));

    let mut mac = Hmac::<Sha256>::new_from_slice(b"s3cr3t").unwrap();
    mac.update(br#"{"id":1}"#);
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    let config = registry.get(Provider::Shopify).unwrap();
    assert!(config.verify(br#"{"id":1}"#, &signature).await);
    assert!(!config.verify(br#"{"id":1}"#, "bogus").await);
}

#[tokio::test]
async fn every_provider_accepts_its_own_signature() {
    let handlers = Handlers::new();
    let intake = WebhookIntake::new(Arc::new(secrets().build_registry()), Arc::new(handlers.processor()));
    let payload = r#"{"id":42,"status":"paid"}"#;

    for provider in Provider::ALL {
        let secret = match provider {
            Provider::Shopify => "s3cr3t",
            Provider::GoDaddy => "gd_secret",
            Provider::Stripe => "whsec_test",
            Provider::Square => "sq_secret",
            Provider::WooCommerce => "wc_secret",
        };
        let signature = sign(provider, payload.as_bytes(), secret).unwrap();

        let result = intake
            .receive(command(provider, payload, &signature, "order.updated"))
            .await
            .unwrap();

        assert!(result.success, "{provider} delivery failed: {:?}", result.error);
    }

    assert_eq!(handlers.order.calls(), Provider::ALL.len());
}

#[tokio::test]
async fn signature_from_another_provider_is_rejected() {
    let intake = WebhookIntake::new(
        Arc::new(secrets().build_registry()),
        Arc::new(Handlers::new().processor()),
    );
    let payload = r#"{"id":1}"#;
    // GoDaddy secret with Shopify's encoding
    let signature = sign(Provider::Shopify, payload.as_bytes(), "gd_secret").unwrap();

    let err = intake
        .receive(command(Provider::GoDaddy, payload, &signature, "domain.registered"))
        .await
        .unwrap_err();

    assert_eq!(err, IntakeError::InvalidSignature);
}

#[tokio::test]
async fn stale_stripe_event_is_rejected_when_tolerance_is_set() {
    let intake = WebhookIntake::new(
        Arc::new(secrets().build_registry()),
        Arc::new(Handlers::new().processor()),
    );
    let payload = r#"{"id":"evt_1"}"#;
    let an_hour_ago = chrono::Utc::now().timestamp() - 3600;
    let header = stripe_signature_header("whsec_test", an_hour_ago, payload.as_bytes()).unwrap();

    let err = intake
        .receive(command(Provider::Stripe, payload, &header, "payment.success"))
        .await
        .unwrap_err();

    assert_eq!(err, IntakeError::InvalidSignature);
}

#[tokio::test]
async fn rotated_secret_replaces_previous_one() {
    let registry = Arc::new(ProviderRegistry::new());
    registry.register(ProviderWebhookConfig::new(Provider::Square).with_secret("old"));
    registry.register(ProviderWebhookConfig::new(Provider::Square).with_secret("new"));
    let intake = WebhookIntake::new(registry, Arc::new(Handlers::new().processor()));
    let payload = "{}";

    let old = sign(Provider::Square, payload.as_bytes(), "old").unwrap();
    let new = sign(Provider::Square, payload.as_bytes(), "new").unwrap();

    assert!(intake
        .receive(command(Provider::Square, payload, &old, "payment.created"))
        .await
        .is_err());
    assert!(intake
        .receive(command(Provider::Square, payload, &new, "payment.created"))
        .await
        .is_ok());
}

// =============================================================================
// Dispatch outcomes
// =============================================================================

#[tokio::test]
async fn unknown_event_type_is_acknowledged_without_dispatch() {
    let handlers = Handlers::new();
    let intake = WebhookIntake::new(Arc::new(secrets().build_registry()), Arc::new(handlers.processor()));
    let payload = r#"{"topic":"carts/update"}"#;
    let signature = sign(Provider::Shopify, payload.as_bytes(), "s3cr3t").unwrap();

    let result = intake
        .receive(command(Provider::Shopify, payload, &signature, "cart.updated"))
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.is_unhandled());
    assert_eq!(handlers.order.calls(), 0);
    assert_eq!(handlers.product.calls(), 0);
}

#[tokio::test]
async fn handler_failure_is_reported_in_result() {
    let handlers = Handlers {
        payment: CountingHandler::failing(),
        ..Handlers::new()
    };
    let intake = WebhookIntake::new(Arc::new(secrets().build_registry()), Arc::new(handlers.processor()));
    let payload = r#"{"amount":100}"#;
    let signature = sign(Provider::WooCommerce, payload.as_bytes(), "wc_secret").unwrap();

    let result = intake
        .receive(command(Provider::WooCommerce, payload, &signature, "payment.failed"))
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("inventory service unavailable"));
    assert_eq!(result.category, Some(EventCategory::Payment));
}

#[tokio::test]
async fn redelivery_is_acknowledged_once_processed() {
    let handlers = Handlers::new();
    let processor =
        IdempotentWebhookProcessor::new(handlers.processor(), InMemoryProcessedEventStore::new());
    let intake = WebhookIntake::new(Arc::new(secrets().build_registry()), Arc::new(processor));
    let payload = r#"{"id":7}"#;
    let signature = sign(Provider::GoDaddy, payload.as_bytes(), "gd_secret").unwrap();

    let first = intake
        .receive(command(Provider::GoDaddy, payload, &signature, "hosting.provisioned"))
        .await
        .unwrap();
    let second = intake
        .receive(command(Provider::GoDaddy, payload, &signature, "hosting.provisioned"))
        .await
        .unwrap();

    assert_eq!(first.message.as_deref(), Some("Event evt_100 processed successfully"));
    assert_eq!(second.message.as_deref(), Some("Event evt_100 already processed"));
    assert_eq!(handlers.infrastructure.calls(), 1);
}

#[tokio::test]
async fn failed_delivery_is_retried_by_idempotent_processor() {
    let handlers = Handlers {
        product: CountingHandler::failing(),
        ..Handlers::new()
    };
    let processor =
        IdempotentWebhookProcessor::new(handlers.processor(), InMemoryProcessedEventStore::new());
    let intake = WebhookIntake::new(Arc::new(secrets().build_registry()), Arc::new(processor));
    let payload = r#"{"id":"p1"}"#;
    let signature = sign(Provider::Shopify, payload.as_bytes(), "s3cr3t").unwrap();

    for _ in 0..2 {
        let result = intake
            .receive(command(Provider::Shopify, payload, &signature, "product.created"))
            .await
            .unwrap();
        assert!(!result.success);
    }

    assert_eq!(handlers.product.calls(), 2);
}
