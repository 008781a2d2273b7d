//! Provider identity.
//!
//! The same closed set of platforms is used for inbound webhook verification
//! and for selecting outbound clients on the unified façade.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A third-party commerce or payment platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Shopify,
    GoDaddy,
    Stripe,
    Square,
    WooCommerce,
}

/// Webhook-facing name for the provider identity.
pub type WebhookProvider = Provider;

impl Provider {
    /// Every supported provider, in declaration order.
    pub const ALL: [Provider; 5] = [
        Provider::Shopify,
        Provider::GoDaddy,
        Provider::Stripe,
        Provider::Square,
        Provider::WooCommerce,
    ];

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Shopify => "shopify",
            Provider::GoDaddy => "godaddy",
            Provider::Stripe => "stripe",
            Provider::Square => "square",
            Provider::WooCommerce => "woocommerce",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a supported provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shopify" => Ok(Provider::Shopify),
            "godaddy" => Ok(Provider::GoDaddy),
            "stripe" => Ok(Provider::Stripe),
            "square" => Ok(Provider::Square),
            "woocommerce" => Ok(Provider::WooCommerce),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}
