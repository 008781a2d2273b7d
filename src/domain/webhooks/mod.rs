//! Inbound webhooks: verification, registry, canonical events and dispatch.

mod errors;
mod event;
mod processor;
mod registry;
mod signature;
mod verifier;

pub use errors::VerificationError;
pub use event::{EventCategory, WebhookEvent, WebhookEventType, WebhookProcessorResult};
pub use processor::{
    EventProcessor, IdempotentWebhookProcessor, LoggingEventHandler, WebhookProcessor,
    WebhookProcessorBuilder,
};
pub use registry::{ProviderRegistry, ProviderWebhookConfig};
pub use signature::{
    constant_time_compare, hmac_sha256, sign, stripe_digest, stripe_signature_header,
    DigestEncoding, StripeSignatureHeader,
};
pub use verifier::{verifier_for, HmacDigestVerifier, SignatureVerifier, StripeVerifier};
