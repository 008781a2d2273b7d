//! Stripe API objects and request parameters.
//!
//! Stripe takes form-encoded bodies; nested maps use bracket keys
//! (`metadata[order_id]=1001`).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stripe PaymentIntent object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StripePaymentIntent {
    /// Unique identifier (pi_...).
    pub id: String,

    /// Amount in the smallest currency unit.
    #[serde(default)]
    pub amount: i64,

    #[serde(default)]
    pub currency: String,

    /// requires_payment_method, requires_capture, succeeded, ...
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default)]
    pub customer: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,

    #[serde(default)]
    pub created: i64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stripe Customer object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StripeCustomer {
    /// Unique customer identifier (cus_...).
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub created: i64,

    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Whether the customer has been deleted.
    #[serde(default)]
    pub deleted: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stripe Charge object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StripeCharge {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stripe Refund object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StripeRefund {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub charge: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accumulates form fields in Stripe's bracket notation.
#[derive(Debug, Default)]
struct FormParams(Vec<(String, String)>);

impl FormParams {
    fn push(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    fn push_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    fn metadata(mut self, metadata: &BTreeMap<String, String>) -> Self {
        for (key, value) in metadata {
            self.0.push((format!("metadata[{}]", key), value.clone()));
        }
        self
    }

    fn finish(self) -> Vec<(String, String)> {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePaymentIntentRequest {
    pub amount: i64,
    pub currency: String,
    pub customer: Option<String>,
    pub description: Option<String>,
    pub capture_manually: bool,
    pub metadata: BTreeMap<String, String>,
}

impl CreatePaymentIntentRequest {
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn to_form(&self) -> Vec<(String, String)> {
        FormParams::default()
            .push("amount", self.amount)
            .push("currency", self.currency.to_lowercase())
            .push_opt("customer", self.customer.as_ref())
            .push_opt("description", self.description.as_ref())
            .push_opt("capture_method", self.capture_manually.then_some("manual"))
            .metadata(&self.metadata)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateCustomerRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl CreateCustomerRequest {
    pub fn to_form(&self) -> Vec<(String, String)> {
        FormParams::default()
            .push_opt("email", self.email.as_ref())
            .push_opt("name", self.name.as_ref())
            .push_opt("description", self.description.as_ref())
            .metadata(&self.metadata)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateChargeRequest {
    pub amount: i64,
    pub currency: String,
    /// Card token or source id
    pub source: Option<String>,
    pub customer: Option<String>,
    pub description: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl CreateChargeRequest {
    pub fn to_form(&self) -> Vec<(String, String)> {
        FormParams::default()
            .push("amount", self.amount)
            .push("currency", self.currency.to_lowercase())
            .push_opt("source", self.source.as_ref())
            .push_opt("customer", self.customer.as_ref())
            .push_opt("description", self.description.as_ref())
            .metadata(&self.metadata)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRefundRequest {
    pub payment_intent: Option<String>,
    pub charge: Option<String>,
    /// Partial refund amount; full refund when absent
    pub amount: Option<i64>,
    pub reason: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl CreateRefundRequest {
    pub fn for_payment_intent(payment_intent: impl Into<String>) -> Self {
        Self {
            payment_intent: Some(payment_intent.into()),
            ..Default::default()
        }
    }

    pub fn to_form(&self) -> Vec<(String, String)> {
        FormParams::default()
            .push_opt("payment_intent", self.payment_intent.as_ref())
            .push_opt("charge", self.charge.as_ref())
            .push_opt("amount", self.amount)
            .push_opt("reason", self.reason.as_ref())
            .metadata(&self.metadata)
            .finish()
    }
}
