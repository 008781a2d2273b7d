//! Processed-event store implementations.

mod in_memory;

pub use in_memory::{InMemoryProcessedEventStore, DEFAULT_RETENTION_HOURS};
