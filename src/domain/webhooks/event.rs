//! Canonical webhook event model.
//!
//! Provider payloads are mapped into [`WebhookEvent`] by the caller before
//! they reach the processor. Only the fields needed for dispatch are typed;
//! the provider-specific body travels along in `data` and `raw_payload`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::domain::provider::Provider;

/// Event types understood by the processor.
///
/// Anything outside the fixed taxonomy is kept verbatim in `Unknown` and is
/// acknowledged without being dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WebhookEventType {
    OrderCreated,
    OrderUpdated,
    OrderFulfilled,
    PaymentSuccess,
    PaymentFailed,
    PaymentCreated,
    PaymentUpdated,
    DomainRegistered,
    HostingProvisioned,
    ProductCreated,
    ProductUpdated,
    Unknown(String),
}

impl WebhookEventType {
    /// The fixed taxonomy, in wire order.
    pub const KNOWN: [WebhookEventType; 11] = [
        WebhookEventType::OrderCreated,
        WebhookEventType::OrderUpdated,
        WebhookEventType::OrderFulfilled,
        WebhookEventType::PaymentSuccess,
        WebhookEventType::PaymentFailed,
        WebhookEventType::PaymentCreated,
        WebhookEventType::PaymentUpdated,
        WebhookEventType::DomainRegistered,
        WebhookEventType::HostingProvisioned,
        WebhookEventType::ProductCreated,
        WebhookEventType::ProductUpdated,
    ];

    /// Parses a dotted event type string. Never fails.
    pub fn parse(s: &str) -> Self {
        match s {
            "order.created" => Self::OrderCreated,
            "order.updated" => Self::OrderUpdated,
            "order.fulfilled" => Self::OrderFulfilled,
            "payment.success" => Self::PaymentSuccess,
            "payment.failed" => Self::PaymentFailed,
            "payment.created" => Self::PaymentCreated,
            "payment.updated" => Self::PaymentUpdated,
            "domain.registered" => Self::DomainRegistered,
            "hosting.provisioned" => Self::HostingProvisioned,
            "product.created" => Self::ProductCreated,
            "product.updated" => Self::ProductUpdated,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Dotted wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::OrderCreated => "order.created",
            Self::OrderUpdated => "order.updated",
            Self::OrderFulfilled => "order.fulfilled",
            Self::PaymentSuccess => "payment.success",
            Self::PaymentFailed => "payment.failed",
            Self::PaymentCreated => "payment.created",
            Self::PaymentUpdated => "payment.updated",
            Self::DomainRegistered => "domain.registered",
            Self::HostingProvisioned => "hosting.provisioned",
            Self::ProductCreated => "product.created",
            Self::ProductUpdated => "product.updated",
            Self::Unknown(raw) => raw,
        }
    }

    /// Handler category, or `None` for types outside the taxonomy.
    pub fn category(&self) -> Option<EventCategory> {
        match self {
            Self::OrderCreated | Self::OrderUpdated | Self::OrderFulfilled => {
                Some(EventCategory::Order)
            }
            Self::PaymentSuccess
            | Self::PaymentFailed
            | Self::PaymentCreated
            | Self::PaymentUpdated => Some(EventCategory::Payment),
            Self::DomainRegistered | Self::HostingProvisioned => {
                Some(EventCategory::Infrastructure)
            }
            Self::ProductCreated | Self::ProductUpdated => Some(EventCategory::Product),
            Self::Unknown(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for WebhookEventType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for WebhookEventType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WebhookEventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WebhookEventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Handler categories events are routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Order,
    Payment,
    Infrastructure,
    Product,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Order => "order",
            EventCategory::Payment => "payment",
            EventCategory::Infrastructure => "infrastructure",
            EventCategory::Product => "product",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-agnostic inbound event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    /// Unique per delivery.
    pub id: String,

    pub provider: Provider,

    pub event_type: WebhookEventType,

    /// ISO-8601 on the wire.
    pub timestamp: DateTime<Utc>,

    /// Provider-specific key/value payload.
    #[serde(default)]
    pub data: Map<String, Value>,

    /// Original body as received.
    #[serde(default)]
    pub raw_payload: Value,
}

impl WebhookEvent {
    /// Creates an event stamped with the current time and an empty payload.
    pub fn new(
        id: impl Into<String>,
        provider: Provider,
        event_type: impl Into<WebhookEventType>,
    ) -> Self {
        Self {
            id: id.into(),
            provider,
            event_type: event_type.into(),
            timestamp: Utc::now(),
            data: Map::new(),
            raw_payload: Value::Null,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn with_raw_payload(mut self, raw_payload: Value) -> Self {
        self.raw_payload = raw_payload;
        self
    }

    pub fn category(&self) -> Option<EventCategory> {
        self.event_type.category()
    }
}

/// Outcome of processing one event.
///
/// `success` certifies that dispatch completed without a handler failure,
/// not that the event was acted upon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookProcessorResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Category the event was dispatched to; absent when the type is unhandled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EventCategory>,
}

impl WebhookProcessorResult {
    pub fn processed(event_id: &str, category: Option<EventCategory>) -> Self {
        Self {
            success: true,
            message: Some(format!("Event {} processed successfully", event_id)),
            error: None,
            category,
        }
    }

    pub fn duplicate(event_id: &str, category: Option<EventCategory>) -> Self {
        Self {
            success: true,
            message: Some(format!("Event {} already processed", event_id)),
            error: None,
            category,
        }
    }

    pub fn failed(error: impl Into<String>, category: Option<EventCategory>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            category,
        }
    }

    /// True when the event type matched no handler category.
    pub fn is_unhandled(&self) -> bool {
        self.success && self.category.is_none()
    }
}
