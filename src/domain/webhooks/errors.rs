//! Webhook verification error types.
//!
//! These never cross the verifier boundary: `verify` collapses every variant
//! into `false`. They exist so the cause can be logged as a structured field.

use http::StatusCode;
use thiserror::Error;

/// Reasons a webhook signature was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// Signature header was empty.
    #[error("Missing signature")]
    MissingSignature,

    /// No secret configured for the provider.
    #[error("Missing webhook secret")]
    MissingSecret,

    /// Composite header could not be parsed.
    #[error("Malformed signature header: {0}")]
    MalformedHeader(String),

    /// Signature was not valid in the provider's encoding.
    #[error("Signature is not valid {encoding}")]
    Decode { encoding: &'static str },

    /// HMAC key was rejected.
    #[error("Invalid HMAC key")]
    InvalidKey,

    /// Signed timestamp is outside the accepted window.
    #[error("Timestamp out of range ({age_secs}s)")]
    TimestampOutOfRange { age_secs: i64 },

    /// Computed digest differs from the provided one.
    #[error("Signature mismatch")]
    SignatureMismatch,
}

impl VerificationError {
    /// Stable snake_case identifier for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            VerificationError::MissingSignature => "missing_signature",
            VerificationError::MissingSecret => "missing_secret",
            VerificationError::MalformedHeader(_) => "malformed_header",
            VerificationError::Decode { .. } => "decode",
            VerificationError::InvalidKey => "invalid_key",
            VerificationError::TimestampOutOfRange { .. } => "timestamp_out_of_range",
            VerificationError::SignatureMismatch => "signature_mismatch",
        }
    }

    /// Returns true when the failure points at local configuration rather
    /// than at the sender.
    pub fn is_local_misconfiguration(&self) -> bool {
        matches!(
            self,
            VerificationError::MissingSecret | VerificationError::InvalidKey
        )
    }

    /// Status an HTTP layer should answer the sender with.
    ///
    /// Every variant is reported as unauthorized so the sender learns nothing
    /// about why verification failed.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_header_displays_reason() {
        let err = VerificationError::MalformedHeader("missing timestamp".to_string());
        assert_eq!(err.to_string(), "Malformed signature header: missing timestamp");
    }

    #[test]
    fn decode_displays_encoding() {
        let err = VerificationError::Decode { encoding: "base64" };
        assert_eq!(err.to_string(), "Signature is not valid base64");
    }

    #[test]
    fn kinds_are_distinct() {
        let kinds = [
            VerificationError::MissingSignature.kind(),
            VerificationError::MissingSecret.kind(),
            VerificationError::MalformedHeader(String::new()).kind(),
            VerificationError::Decode { encoding: "hex" }.kind(),
            VerificationError::InvalidKey.kind(),
            VerificationError::TimestampOutOfRange { age_secs: 0 }.kind(),
            VerificationError::SignatureMismatch.kind(),
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }

    #[test]
    fn missing_secret_is_local_misconfiguration() {
        assert!(VerificationError::MissingSecret.is_local_misconfiguration());
        assert!(!VerificationError::SignatureMismatch.is_local_misconfiguration());
    }

    #[test]
    fn all_failures_are_unauthorized() {
        assert_eq!(
            VerificationError::SignatureMismatch.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            VerificationError::MissingSecret.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
