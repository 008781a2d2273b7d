//! Webhook processor - Routes canonical events to category handlers.
//!
//! ## Dispatch
//!
//! | Event types | Handler |
//! |---|---|
//! | `order.*` | order |
//! | `payment.*` | payment |
//! | `domain.registered`, `hosting.provisioned` | infrastructure |
//! | `product.*` | product |
//!
//! Unknown types are acknowledged with a warning. Handler errors and panics
//! are caught and reported in the result, never propagated, so the caller
//! can always answer the sender.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use super::event::{EventCategory, WebhookEvent, WebhookProcessorResult};
use crate::ports::{HandlerError, ProcessedEventStore, SaveResult, WebhookEventHandler};

/// Anything that turns a verified event into a processing result.
#[async_trait]
pub trait EventProcessor: Send + Sync {
    async fn process(&self, event: &WebhookEvent) -> WebhookProcessorResult;
}

/// Handler that only records the event in the log.
///
/// Used for categories the application does not act on.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventHandler;

#[async_trait]
impl WebhookEventHandler for LoggingEventHandler {
    async fn handle(&self, event: &WebhookEvent) -> Result<(), HandlerError> {
        tracing::info!(
            event_id = %event.id,
            provider = %event.provider,
            event_type = %event.event_type,
            "Webhook event received with no registered handler"
        );
        Ok(())
    }
}

/// Dispatches events to one handler per category.
#[derive(Clone)]
pub struct WebhookProcessor {
    order: Arc<dyn WebhookEventHandler>,
    payment: Arc<dyn WebhookEventHandler>,
    infrastructure: Arc<dyn WebhookEventHandler>,
    product: Arc<dyn WebhookEventHandler>,
}

impl WebhookProcessor {
    pub fn new(
        order: Arc<dyn WebhookEventHandler>,
        payment: Arc<dyn WebhookEventHandler>,
        infrastructure: Arc<dyn WebhookEventHandler>,
        product: Arc<dyn WebhookEventHandler>,
    ) -> Self {
        Self {
            order,
            payment,
            infrastructure,
            product,
        }
    }

    pub fn builder() -> WebhookProcessorBuilder {
        WebhookProcessorBuilder::default()
    }

    fn handler_for(&self, category: EventCategory) -> &Arc<dyn WebhookEventHandler> {
        match category {
            EventCategory::Order => &self.order,
            EventCategory::Payment => &self.payment,
            EventCategory::Infrastructure => &self.infrastructure,
            EventCategory::Product => &self.product,
        }
    }

    /// Processes one event. Never fails; the outcome is in the result.
    pub async fn process(&self, event: &WebhookEvent) -> WebhookProcessorResult {
        let Some(category) = event.category() else {
            tracing::warn!(
                event_id = %event.id,
                provider = %event.provider,
                event_type = %event.event_type,
                "Unhandled webhook event type"
            );
            return WebhookProcessorResult::processed(&event.id, None);
        };

        let handler = self.handler_for(category);
        let outcome = AssertUnwindSafe(handler.handle(event))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(HandlerError::Panicked(panic_message(panic.as_ref()))));

        match outcome {
            Ok(()) => {
                tracing::debug!(
                    event_id = %event.id,
                    provider = %event.provider,
                    category = %category,
                    "Webhook event processed"
                );
                WebhookProcessorResult::processed(&event.id, Some(category))
            }
            Err(err) => {
                tracing::error!(
                    event_id = %event.id,
                    provider = %event.provider,
                    event_type = %event.event_type,
                    category = %category,
                    error = %err,
                    "Webhook handler failed"
                );
                WebhookProcessorResult::failed(err.to_string(), Some(category))
            }
        }
    }
}

#[async_trait]
impl EventProcessor for WebhookProcessor {
    async fn process(&self, event: &WebhookEvent) -> WebhookProcessorResult {
        WebhookProcessor::process(self, event).await
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Builder for [`WebhookProcessor`]. Unset categories only log.
#[derive(Default)]
pub struct WebhookProcessorBuilder {
    order: Option<Arc<dyn WebhookEventHandler>>,
    payment: Option<Arc<dyn WebhookEventHandler>>,
    infrastructure: Option<Arc<dyn WebhookEventHandler>>,
    product: Option<Arc<dyn WebhookEventHandler>>,
}

impl WebhookProcessorBuilder {
    pub fn order_handler(mut self, handler: Arc<dyn WebhookEventHandler>) -> Self {
        self.order = Some(handler);
        self
    }

    pub fn payment_handler(mut self, handler: Arc<dyn WebhookEventHandler>) -> Self {
        self.payment = Some(handler);
        self
    }

    pub fn infrastructure_handler(mut self, handler: Arc<dyn WebhookEventHandler>) -> Self {
        self.infrastructure = Some(handler);
        self
    }

    pub fn product_handler(mut self, handler: Arc<dyn WebhookEventHandler>) -> Self {
        self.product = Some(handler);
        self
    }

    pub fn build(self) -> WebhookProcessor {
        let fallback = || -> Arc<dyn WebhookEventHandler> { Arc::new(LoggingEventHandler) };
        WebhookProcessor {
            order: self.order.unwrap_or_else(fallback),
            payment: self.payment.unwrap_or_else(fallback),
            infrastructure: self.infrastructure.unwrap_or_else(fallback),
            product: self.product.unwrap_or_else(fallback),
        }
    }
}

/// Wraps a [`WebhookProcessor`] so each event is dispatched at most once
/// per successful delivery.
///
/// Only successful results are recorded, so a delivery that failed is
/// dispatched again when the sender retries.
pub struct IdempotentWebhookProcessor<S: ProcessedEventStore> {
    processor: WebhookProcessor,
    store: S,
}

impl<S: ProcessedEventStore> IdempotentWebhookProcessor<S> {
    pub fn new(processor: WebhookProcessor, store: S) -> Self {
        Self { processor, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn process(&self, event: &WebhookEvent) -> WebhookProcessorResult {
        match self.store.contains(event.provider, &event.id).await {
            Ok(true) => {
                tracing::info!(
                    event_id = %event.id,
                    provider = %event.provider,
                    "Duplicate webhook event skipped"
                );
                return WebhookProcessorResult::duplicate(&event.id, event.category());
            }
            Ok(false) => {}
            Err(err) => {
                tracing::error!(
                    event_id = %event.id,
                    provider = %event.provider,
                    error = %err,
                    "Processed event lookup failed"
                );
                return WebhookProcessorResult::failed(err.to_string(), event.category());
            }
        }

        let result = self.processor.process(event).await;
        if !result.success {
            return result;
        }

        match self.store.mark_processed(event.provider, &event.id).await {
            Ok(SaveResult::Inserted) => result,
            Ok(SaveResult::AlreadyExists) => {
                // Lost a race with a concurrent delivery of the same event
                tracing::info!(
                    event_id = %event.id,
                    provider = %event.provider,
                    "Concurrent delivery already recorded event"
                );
                WebhookProcessorResult::duplicate(&event.id, event.category())
            }
            Err(err) => {
                tracing::warn!(
                    event_id = %event.id,
                    provider = %event.provider,
                    error = %err,
                    "Failed to record processed event"
                );
                result
            }
        }
    }
}

#[async_trait]
impl<S: ProcessedEventStore> EventProcessor for IdempotentWebhookProcessor<S> {
    async fn process(&self, event: &WebhookEvent) -> WebhookProcessorResult {
        IdempotentWebhookProcessor::process(self, event).await
    }
}
