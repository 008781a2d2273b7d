//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid Stripe API key format")]
    InvalidStripeKey,

    #[error("Invalid Shopify shop domain: {0}")]
    InvalidShopDomain(String),

    #[error("WooCommerce site URL must start with http:// or https://")]
    InvalidSiteUrl,

    #[error("Invalid base URL override for {0}")]
    InvalidBaseUrl(&'static str),

    #[error("Invalid log level filter: {0}")]
    InvalidLogLevel(String),
}
