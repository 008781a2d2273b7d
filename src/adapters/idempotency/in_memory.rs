//! In-memory processed-event store for tests and single-process deployments.
//!
//! Entries live in a HashMap keyed by `(provider, event id)`. Restarting the
//! process forgets every entry, so redeliveries after a restart are
//! processed again.
//!
//! Inserts sweep expired entries once the map reaches a high-water mark, so
//! memory stays bounded by the number of events seen within one retention
//! window.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::domain::Provider;
use crate::ports::{ProcessedEventStore, SaveResult, StoreError};

/// How long processed events are remembered by default.
pub const DEFAULT_RETENTION_HOURS: i64 = 72;

/// Smallest map size that triggers a sweep on insert.
const MIN_SWEEP_THRESHOLD: usize = 64;

#[derive(Debug)]
struct Entries {
    processed: HashMap<(Provider, String), DateTime<Utc>>,
    sweep_at: usize,
}

#[derive(Debug, Clone)]
pub struct InMemoryProcessedEventStore {
    entries: Arc<RwLock<Entries>>,
    retention: Duration,
}

impl Default for InMemoryProcessedEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProcessedEventStore {
    pub fn new() -> Self {
        Self::with_retention(Duration::hours(DEFAULT_RETENTION_HOURS))
    }

    /// Entries older than `retention` are ignored by lookups and removed
    /// by [`purge_expired`](Self::purge_expired) or by a sweep on insert.
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries {
                processed: HashMap::new(),
                sweep_at: MIN_SWEEP_THRESHOLD,
            })),
            retention,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.processed.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.processed.is_empty()
    }

    /// Drops entries past the retention window.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        let removed = self.delete_before(Utc::now() - self.retention).await?;
        if removed > 0 {
            tracing::debug!(removed, "Purged expired processed events");
        }
        Ok(removed)
    }

    fn is_live(&self, processed_at: DateTime<Utc>) -> bool {
        processed_at > Utc::now() - self.retention
    }
}

#[async_trait]
impl ProcessedEventStore for InMemoryProcessedEventStore {
    async fn contains(&self, provider: Provider, event_id: &str) -> Result<bool, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .processed
            .get(&(provider, event_id.to_string()))
            .is_some_and(|at| self.is_live(*at)))
    }

    async fn mark_processed(
        &self,
        provider: Provider,
        event_id: &str,
    ) -> Result<SaveResult, StoreError> {
        let mut entries = self.entries.write().await;
        let key = (provider, event_id.to_string());
        if entries.processed.get(&key).is_some_and(|at| self.is_live(*at)) {
            return Ok(SaveResult::AlreadyExists);
        }

        if entries.processed.len() >= entries.sweep_at {
            let cutoff = Utc::now() - self.retention;
            let before = entries.processed.len();
            entries.processed.retain(|_, at| *at > cutoff);
            let removed = before - entries.processed.len();
            entries.sweep_at = (entries.processed.len() * 2).max(MIN_SWEEP_THRESHOLD);
            if removed > 0 {
                tracing::debug!(removed, "Swept expired processed events");
            }
        }

        entries.processed.insert(key, Utc::now());
        Ok(SaveResult::Inserted)
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut entries = self.entries.write().await;
        let before = entries.processed.len();
        entries.processed.retain(|_, at| *at >= cutoff);
        Ok((before - entries.processed.len()) as u64)
    }
}
