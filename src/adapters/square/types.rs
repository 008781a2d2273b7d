//! Square Connect v2 types.
//!
//! Square wraps single objects in envelopes (`{"payment": {..}}`) and lists
//! in plural envelopes with an optional `cursor`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Amount in the smallest currency unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquareMoney {
    pub amount: i64,
    pub currency: String,
}

impl SquareMoney {
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into().to_uppercase(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SquarePayment {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount_money: Option<SquareMoney>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of payments.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SquarePaymentList {
    #[serde(default)]
    pub payments: Vec<SquarePayment>,
    /// Pass back as the list cursor to fetch the next page.
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SquareLineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Square sends quantities as decimal strings.
    #[serde(default)]
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price_money: Option<SquareMoney>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SquareOrder {
    pub id: String,
    #[serde(default)]
    pub location_id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default)]
    pub line_items: Vec<SquareLineItem>,
    #[serde(default)]
    pub total_money: Option<SquareMoney>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Order body for create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SquareOrderInput {
    pub location_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<SquareLineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    /// Required by Square when updating an existing order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    /// Card nonce, card-on-file id or other payment source.
    pub source_id: String,
    pub idempotency_key: String,
    pub amount_money: SquareMoney,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefundPaymentRequest {
    pub idempotency_key: String,
    pub payment_id: String,
    pub amount_money: SquareMoney,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SquareRefund {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub amount_money: Option<SquareMoney>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SquareLocation {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaymentEnvelope {
    pub payment: SquarePayment,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderEnvelope {
    pub order: SquareOrder,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefundEnvelope {
    pub refund: SquareRefund,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocationEnvelope {
    pub location: SquareLocation,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocationsEnvelope {
    #[serde(default)]
    pub locations: Vec<SquareLocation>,
}
