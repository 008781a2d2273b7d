//! Gateway error types for outbound provider calls and the unified façade.

use http::StatusCode;
use thiserror::Error;

use super::provider::Provider;

/// Errors raised by provider clients and the unified API client.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The requested provider has no client because its configuration was absent.
    #[error("{provider} client is not configured")]
    ProviderNotConfigured { provider: Provider },

    /// Caller payload is missing fields the provider requires.
    #[error("Invalid {provider} request: {message}")]
    Validation { provider: Provider, message: String },

    /// The unified operation has no mapping for this provider.
    #[error("Operation '{operation}' is not supported for {provider}")]
    UnsupportedOperation {
        operation: &'static str,
        provider: Provider,
    },

    /// Provider answered with a non-success status.
    #[error("{provider} API error {status} {status_text}")]
    ProviderApi {
        provider: Provider,
        status: u16,
        status_text: String,
        body: String,
    },

    /// Request never produced a response.
    #[error("{provider} network error: {message}")]
    Network { provider: Provider, message: String },

    /// Response body could not be parsed.
    #[error("Failed to decode {provider} response: {message}")]
    Decode { provider: Provider, message: String },

    /// HTTP client construction failed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl GatewayError {
    pub fn not_configured(provider: Provider) -> Self {
        GatewayError::ProviderNotConfigured { provider }
    }

    pub fn validation(provider: Provider, message: impl Into<String>) -> Self {
        GatewayError::Validation {
            provider,
            message: message.into(),
        }
    }

    pub fn unsupported(operation: &'static str, provider: Provider) -> Self {
        GatewayError::UnsupportedOperation {
            operation,
            provider,
        }
    }

    /// Provider the error relates to, if any.
    pub fn provider(&self) -> Option<Provider> {
        match self {
            GatewayError::ProviderNotConfigured { provider }
            | GatewayError::Validation { provider, .. }
            | GatewayError::UnsupportedOperation { provider, .. }
            | GatewayError::ProviderApi { provider, .. }
            | GatewayError::Network { provider, .. }
            | GatewayError::Decode { provider, .. } => Some(*provider),
            GatewayError::Client(_) => None,
        }
    }

    /// Returns true if repeating the call may succeed.
    ///
    /// Configuration, validation and unsupported-operation failures are
    /// permanent. Nothing in this crate retries automatically.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Network { .. } => true,
            GatewayError::ProviderApi { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Maps the error to the status an HTTP layer should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::UnsupportedOperation { .. } => StatusCode::BAD_REQUEST,
            GatewayError::ProviderApi { status, .. } if *status == 404 => StatusCode::NOT_FOUND,
            GatewayError::ProviderApi { .. } | GatewayError::Decode { .. } => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Network { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::ProviderNotConfigured { .. } | GatewayError::Client(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
