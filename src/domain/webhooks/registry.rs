//! Provider registry.
//!
//! Maps each provider to the configuration used to verify its webhooks.
//! The registry is an ordinary value: build one at startup, wrap it in an
//! `Arc` and hand it to whatever receives webhooks. Tests build their own.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};

use super::errors::VerificationError;
use super::verifier::{log_rejection, verifier_for, SignatureVerifier};
use crate::domain::provider::Provider;

/// Verification settings for one provider.
#[derive(Clone)]
pub struct ProviderWebhookConfig {
    provider: Provider,
    secret: Option<SecretString>,
    api_key: Option<SecretString>,
    verifier: Arc<dyn SignatureVerifier>,
}

impl ProviderWebhookConfig {
    /// Config using the provider's default verifier and no secret.
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            secret: None,
            api_key: None,
            verifier: verifier_for(provider),
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(SecretString::new(secret.into()));
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key.into()));
        self
    }

    /// Replaces the verifier, e.g. a Stripe verifier with a tolerance.
    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn secret(&self) -> Option<&SecretString> {
        self.secret.as_ref()
    }

    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref()
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    pub fn verifier(&self) -> &Arc<dyn SignatureVerifier> {
        &self.verifier
    }

    /// Verifies `payload` against the configured secret.
    ///
    /// Without a secret the delivery is rejected.
    pub async fn verify(&self, payload: &[u8], signature: &str) -> bool {
        match &self.secret {
            Some(secret) => {
                self.verifier
                    .verify(payload, signature, secret.expose_secret())
                    .await
            }
            None => {
                log_rejection(self.provider, &VerificationError::MissingSecret);
                false
            }
        }
    }

    /// Verifies with an explicitly supplied secret.
    pub async fn verify_with_secret(&self, payload: &[u8], signature: &str, secret: &str) -> bool {
        self.verifier.verify(payload, signature, secret).await
    }
}

impl fmt::Debug for ProviderWebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderWebhookConfig")
            .field("provider", &self.provider)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

/// Keyed store of webhook configurations.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    configs: RwLock<HashMap<Provider, ProviderWebhookConfig>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `config`, replacing any previous entry for the provider.
    pub fn register(&self, config: ProviderWebhookConfig) {
        let provider = config.provider();
        let previous = self
            .configs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(provider, config);

        tracing::info!(
            provider = %provider,
            replaced = previous.is_some(),
            "Registered webhook provider"
        );
    }

    pub fn get(&self, provider: Provider) -> Option<ProviderWebhookConfig> {
        self.configs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&provider)
            .cloned()
    }

    pub fn has(&self, provider: Provider) -> bool {
        self.configs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&provider)
    }

    /// Every registered configuration, in no particular order.
    pub fn get_all(&self) -> Vec<ProviderWebhookConfig> {
        self.configs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.configs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
