//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `COMMERCE_GATEWAY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use commerce_gateway::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! let registry = config.webhooks.build_registry();
//! ```

mod error;
mod logging;
mod providers;
mod webhooks;

pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use providers::{
    GoDaddyConfig, ShopifyConfig, SquareConfig, StripeConfig, UnifiedConfig, WooCommerceConfig,
    DEFAULT_SHOPIFY_API_VERSION, DEFAULT_SQUARE_API_VERSION,
};
pub use webhooks::WebhookSecretsConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section is optional; an empty environment yields a gateway with no
/// registered webhook providers and no outbound clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Log level and output format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Webhook signing secrets
    #[serde(default)]
    pub webhooks: WebhookSecretsConfig,

    /// Outbound provider credentials
    #[serde(default)]
    pub providers: UnifiedConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `COMMERCE_GATEWAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `COMMERCE_GATEWAY__WEBHOOKS__SHOPIFY_SECRET=...` -> `webhooks.shopify_secret`
    /// - `COMMERCE_GATEWAY__PROVIDERS__STRIPE__API_KEY=...` -> `providers.stripe.api_key`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COMMERCE_GATEWAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any present sub-configuration is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.providers.validate()?;
        Ok(())
    }
}
