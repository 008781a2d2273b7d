//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `WebhookEventHandler` - Business logic invoked per event category
//! - `ProcessedEventStore` - Idempotency tracking for webhook deliveries

mod processed_event_store;
mod webhook_event_handler;

pub use processed_event_store::{ProcessedEventStore, SaveResult, StoreError};
pub use webhook_event_handler::{HandlerError, WebhookEventHandler};
