//! WebhookIntake - Inbound entry point for provider webhooks.
//!
//! Looks up the provider's verification config, verifies the signature over
//! the raw body and only then hands the canonical event to the processor.

use std::sync::Arc;

use http::StatusCode;
use thiserror::Error;

use crate::domain::webhooks::{EventProcessor, ProviderRegistry, WebhookEvent, WebhookProcessorResult};
use crate::domain::Provider;

/// Command to receive one webhook delivery.
#[derive(Debug, Clone)]
pub struct ReceiveWebhookCommand {
    pub provider: Provider,
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// Signature header value.
    pub signature: String,
    /// Canonical event already mapped from the payload by the caller.
    pub event: WebhookEvent,
}

/// Reasons a delivery is rejected before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("No webhook configuration registered for {0}")]
    ProviderNotRegistered(Provider),

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Event provider {event} does not match delivery provider {delivery}")]
    ProviderMismatch { delivery: Provider, event: Provider },
}

impl IntakeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IntakeError::ProviderNotRegistered(_) => StatusCode::NOT_FOUND,
            IntakeError::InvalidSignature => StatusCode::UNAUTHORIZED,
            IntakeError::ProviderMismatch { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

pub struct WebhookIntake {
    registry: Arc<ProviderRegistry>,
    processor: Arc<dyn EventProcessor>,
}

impl WebhookIntake {
    pub fn new(registry: Arc<ProviderRegistry>, processor: Arc<dyn EventProcessor>) -> Self {
        Self {
            registry,
            processor,
        }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub async fn receive(
        &self,
        cmd: ReceiveWebhookCommand,
    ) -> Result<WebhookProcessorResult, IntakeError> {
        // 1. Find the provider's verification config
        let config = self.registry.get(cmd.provider).ok_or_else(|| {
            tracing::warn!(provider = %cmd.provider, "Webhook for unregistered provider");
            IntakeError::ProviderNotRegistered(cmd.provider)
        })?;

        // 2. Verify the signature over the raw body
        if !config.verify(&cmd.payload, &cmd.signature).await {
            tracing::warn!(
                provider = %cmd.provider,
                event_id = %cmd.event.id,
                "Rejected webhook with invalid signature"
            );
            return Err(IntakeError::InvalidSignature);
        }

        if cmd.event.provider != cmd.provider {
            tracing::warn!(
                provider = %cmd.provider,
                event_provider = %cmd.event.provider,
                event_id = %cmd.event.id,
                "Webhook event provider mismatch"
            );
            return Err(IntakeError::ProviderMismatch {
                delivery: cmd.provider,
                event: cmd.event.provider,
            });
        }

        // 3. Dispatch
        tracing::info!(
            provider = %cmd.provider,
            event_id = %cmd.event.id,
            event_type = %cmd.event.event_type.as_str(),
            "Webhook verified"
        );
        Ok(self.processor.process(&cmd.event).await)
    }
}
