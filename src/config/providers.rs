//! Outbound provider configuration
//!
//! Each provider has an optional sub-configuration. A client is only built
//! for providers whose sub-configuration is present.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

pub const DEFAULT_SHOPIFY_API_VERSION: &str = "2024-01";
pub const DEFAULT_SQUARE_API_VERSION: &str = "2024-01-18";

const GODADDY_LIVE_URL: &str = "https://api.godaddy.com";
const GODADDY_SANDBOX_URL: &str = "https://api.ote-godaddy.com";
const STRIPE_API_URL: &str = "https://api.stripe.com/v1";
const SQUARE_LIVE_URL: &str = "https://connect.squareup.com/v2";
const SQUARE_SANDBOX_URL: &str = "https://connect.squareupsandbox.com/v2";

fn default_shopify_api_version() -> String {
    DEFAULT_SHOPIFY_API_VERSION.to_string()
}

fn default_square_api_version() -> String {
    DEFAULT_SQUARE_API_VERSION.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn is_blank(secret: &SecretString) -> bool {
    secret.expose_secret().trim().is_empty()
}

fn validate_base_url(base_url: &Option<String>, name: &'static str) -> Result<(), ValidationError> {
    match base_url {
        Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
            Err(ValidationError::InvalidBaseUrl(name))
        }
        _ => Ok(()),
    }
}

/// Shopify Admin API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ShopifyConfig {
    /// App API key
    pub api_key: String,

    /// App API secret
    pub api_secret: SecretString,

    /// Shop domain, e.g. `my-store.myshopify.com`
    pub shop_domain: String,

    /// Admin API access token (`shpat_...`)
    pub access_token: SecretString,

    #[serde(default = "default_shopify_api_version")]
    pub api_version: String,

    /// Overrides the computed base URL
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ShopifyConfig {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        shop_domain: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: SecretString::new(api_secret.into()),
            shop_domain: shop_domain.into(),
            access_token: SecretString::new(access_token.into()),
            api_version: default_shopify_api_version(),
            base_url: None,
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// `https://{shop_domain}/admin/api/{api_version}` unless overridden
    pub fn api_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!(
                "https://{}/admin/api/{}",
                self.shop_domain.trim_end_matches('/'),
                self.api_version
            ),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.shop_domain.trim().is_empty() {
            return Err(ValidationError::MissingRequired("SHOPIFY_SHOP_DOMAIN"));
        }
        if is_blank(&self.access_token) {
            return Err(ValidationError::MissingRequired("SHOPIFY_ACCESS_TOKEN"));
        }
        if self.shop_domain.contains("://")
            || self.shop_domain.contains('/')
            || !self.shop_domain.contains('.')
        {
            return Err(ValidationError::InvalidShopDomain(self.shop_domain.clone()));
        }
        validate_base_url(&self.base_url, "shopify")
    }
}

/// GoDaddy API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GoDaddyConfig {
    pub api_key: String,

    pub api_secret: SecretString,

    /// Selects the live API instead of the OTE sandbox
    #[serde(default)]
    pub is_production: bool,

    #[serde(default)]
    pub base_url: Option<String>,
}

impl GoDaddyConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: SecretString::new(api_secret.into()),
            is_production: false,
            base_url: None,
        }
    }

    pub fn with_production(mut self, is_production: bool) -> Self {
        self.is_production = is_production;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn api_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None if self.is_production => GODADDY_LIVE_URL.to_string(),
            None => GODADDY_SANDBOX_URL.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("GODADDY_API_KEY"));
        }
        if is_blank(&self.api_secret) {
            return Err(ValidationError::MissingRequired("GODADDY_API_SECRET"));
        }
        validate_base_url(&self.base_url, "godaddy")
    }
}

/// Stripe API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StripeConfig {
    /// Secret (`sk_`) or restricted (`rk_`) key
    pub api_key: SecretString,

    #[serde(default)]
    pub base_url: Option<String>,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn api_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| STRIPE_API_URL.to_string())
    }

    pub fn is_test_mode(&self) -> bool {
        let key = self.api_key.expose_secret();
        key.starts_with("sk_test_") || key.starts_with("rk_test_")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let key = self.api_key.expose_secret();
        if key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if !(key.starts_with("sk_") || key.starts_with("rk_")) {
            return Err(ValidationError::InvalidStripeKey);
        }
        validate_base_url(&self.base_url, "stripe")
    }
}

/// Square API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SquareConfig {
    pub access_token: SecretString,

    #[serde(default)]
    pub is_production: bool,

    /// Sent as the `Square-Version` header
    #[serde(default = "default_square_api_version")]
    pub api_version: String,

    #[serde(default)]
    pub base_url: Option<String>,
}

impl SquareConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            is_production: false,
            api_version: default_square_api_version(),
            base_url: None,
        }
    }

    pub fn with_production(mut self, is_production: bool) -> Self {
        self.is_production = is_production;
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn api_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None if self.is_production => SQUARE_LIVE_URL.to_string(),
            None => SQUARE_SANDBOX_URL.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.access_token) {
            return Err(ValidationError::MissingRequired("SQUARE_ACCESS_TOKEN"));
        }
        validate_base_url(&self.base_url, "square")
    }
}

/// WooCommerce REST API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WooCommerceConfig {
    /// Store URL, e.g. `https://shop.example.com`
    pub site_url: String,

    pub consumer_key: String,

    pub consumer_secret: SecretString,

    #[serde(default)]
    pub base_url: Option<String>,
}

impl WooCommerceConfig {
    pub fn new(
        site_url: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        Self {
            site_url: site_url.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: SecretString::new(consumer_secret.into()),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// `{site_url}/wp-json/wc/v3` unless overridden
    pub fn api_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!("{}/wp-json/wc/v3", self.site_url.trim_end_matches('/')),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.site_url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("WOOCOMMERCE_SITE_URL"));
        }
        if self.consumer_key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("WOOCOMMERCE_CONSUMER_KEY"));
        }
        if is_blank(&self.consumer_secret) {
            return Err(ValidationError::MissingRequired("WOOCOMMERCE_CONSUMER_SECRET"));
        }
        if !(self.site_url.starts_with("http://") || self.site_url.starts_with("https://")) {
            return Err(ValidationError::InvalidSiteUrl);
        }
        validate_base_url(&self.base_url, "woocommerce")
    }
}

/// Credentials for every outbound provider the façade may talk to
#[derive(Debug, Clone, Deserialize)]
pub struct UnifiedConfig {
    #[serde(default)]
    pub shopify: Option<ShopifyConfig>,

    #[serde(default)]
    pub godaddy: Option<GoDaddyConfig>,

    #[serde(default)]
    pub stripe: Option<StripeConfig>,

    #[serde(default)]
    pub square: Option<SquareConfig>,

    #[serde(default)]
    pub woocommerce: Option<WooCommerceConfig>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for UnifiedConfig {
    fn default() -> Self {
        Self {
            shopify: None,
            godaddy: None,
            stripe: None,
            square: None,
            woocommerce: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl UnifiedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shopify(mut self, config: ShopifyConfig) -> Self {
        self.shopify = Some(config);
        self
    }

    pub fn with_godaddy(mut self, config: GoDaddyConfig) -> Self {
        self.godaddy = Some(config);
        self
    }

    pub fn with_stripe(mut self, config: StripeConfig) -> Self {
        self.stripe = Some(config);
        self
    }

    pub fn with_square(mut self, config: SquareConfig) -> Self {
        self.square = Some(config);
        self
    }

    pub fn with_woocommerce(mut self, config: WooCommerceConfig) -> Self {
        self.woocommerce = Some(config);
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate every present sub-configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if let Some(shopify) = &self.shopify {
            shopify.validate()?;
        }
        if let Some(godaddy) = &self.godaddy {
            godaddy.validate()?;
        }
        if let Some(stripe) = &self.stripe {
            stripe.validate()?;
        }
        if let Some(square) = &self.square {
            square.validate()?;
        }
        if let Some(woocommerce) = &self.woocommerce {
            woocommerce.validate()?;
        }
        Ok(())
    }
}
