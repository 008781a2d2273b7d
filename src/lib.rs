//! Commerce Gateway - Webhook verification and outbound API façade
//!
//! Verifies inbound webhooks from Shopify, GoDaddy, Stripe, Square and
//! WooCommerce, normalizes them into one canonical event model for category
//! dispatch, and exposes a single client for outbound calls to the same
//! providers.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

pub use application::{UnifiedApiClient, WebhookIntake};
pub use domain::webhooks::{ProviderRegistry, WebhookEvent, WebhookProcessor};
pub use domain::{GatewayError, Provider};
