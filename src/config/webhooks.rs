//! Webhook signing secrets

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::webhooks::{ProviderRegistry, ProviderWebhookConfig, StripeVerifier};
use crate::domain::Provider;

/// Signing secret per provider; absent providers are not registered
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookSecretsConfig {
    #[serde(default)]
    pub shopify_secret: Option<SecretString>,

    #[serde(default)]
    pub godaddy_secret: Option<SecretString>,

    /// Stripe endpoint secret (`whsec_...`)
    #[serde(default)]
    pub stripe_secret: Option<SecretString>,

    #[serde(default)]
    pub square_secret: Option<SecretString>,

    #[serde(default)]
    pub woocommerce_secret: Option<SecretString>,

    /// Maximum Stripe event age; unset disables the check
    #[serde(default)]
    pub stripe_tolerance_secs: Option<i64>,
}

impl WebhookSecretsConfig {
    /// Configured, non-empty secret for `provider`
    pub fn secret_for(&self, provider: Provider) -> Option<&SecretString> {
        let secret = match provider {
            Provider::Shopify => &self.shopify_secret,
            Provider::GoDaddy => &self.godaddy_secret,
            Provider::Stripe => &self.stripe_secret,
            Provider::Square => &self.square_secret,
            Provider::WooCommerce => &self.woocommerce_secret,
        };
        secret
            .as_ref()
            .filter(|s| !s.expose_secret().trim().is_empty())
    }

    pub fn configured_providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.secret_for(*p).is_some())
            .collect()
    }

    /// Webhook config for `provider`, if its secret is set
    pub fn webhook_config(&self, provider: Provider) -> Option<ProviderWebhookConfig> {
        let secret = self.secret_for(provider)?;
        let config =
            ProviderWebhookConfig::new(provider).with_secret(secret.expose_secret().clone());

        Some(match (provider, self.stripe_tolerance_secs) {
            (Provider::Stripe, Some(tolerance)) => {
                config.with_verifier(Arc::new(StripeVerifier::new().with_tolerance(tolerance)))
            }
            _ => config,
        })
    }

    /// Registers every provider with a configured secret.
    pub fn register_into(&self, registry: &ProviderRegistry) {
        for provider in Provider::ALL {
            if let Some(config) = self.webhook_config(provider) {
                registry.register(config);
            }
        }
    }

    /// Builds a registry holding every provider with a configured secret.
    pub fn build_registry(&self) -> ProviderRegistry {
        let registry = ProviderRegistry::new();
        self.register_into(&registry);
        registry
    }
}
