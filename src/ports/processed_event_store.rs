//! ProcessedEventStore port - Interface for tracking processed webhook events.
//!
//! Webhook senders redeliver on timeouts and non-2xx answers. The store
//! remembers which `(provider, event id)` pairs were already handled so a
//! redelivery can be acknowledged without dispatching it again.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::provider::Provider;

/// Errors raised by a processed-event store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Processed event store unavailable: {0}")]
    Unavailable(String),
}

/// Result of recording an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// First time seeing this event.
    Inserted,
    /// Another delivery already recorded it.
    AlreadyExists,
}

/// Port for tracking which webhook events have been processed.
///
/// Event ids are only unique per provider, so both form the key.
#[async_trait]
pub trait ProcessedEventStore: Send + Sync {
    /// Returns `true` if the event was already processed.
    async fn contains(&self, provider: Provider, event_id: &str) -> Result<bool, StoreError>;

    /// Records the event as processed.
    ///
    /// Call this AFTER successful handling so failed deliveries are retried.
    async fn mark_processed(
        &self,
        provider: Provider,
        event_id: &str,
    ) -> Result<SaveResult, StoreError>;

    /// Removes entries processed before `cutoff`.
    ///
    /// Returns the number of entries deleted.
    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}
