//! WebhookEventHandler port - Business logic invoked per event category.
//!
//! The processor guarantees dispatch to exactly one handler per known event
//! type. What a handler does with the event is up to the application.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::webhooks::WebhookEvent;

/// Failure reported by a category handler.
///
/// Never propagated past the processor; converted into a failed result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// Handler returned an error.
    #[error("{0}")]
    Failed(String),

    /// Handler panicked while processing.
    #[error("Handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }
}

/// Handler for one category of webhook events.
#[async_trait]
pub trait WebhookEventHandler: Send + Sync {
    /// Handles the event.
    ///
    /// Implementations should be idempotent: senders redeliver.
    async fn handle(&self, event: &WebhookEvent) -> Result<(), HandlerError>;
}
