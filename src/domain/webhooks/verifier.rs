//! Provider signature verifiers.
//!
//! Verification is fail-closed: [`SignatureVerifier::verify`] answers a plain
//! bool and never surfaces the cause to the caller. The cause is emitted as
//! structured log fields (`provider`, `error_kind`, `error`) so forged
//! deliveries can be told apart from broken local configuration.

use std::sync::Arc;

use async_trait::async_trait;

use super::errors::VerificationError;
use super::signature::{
    constant_time_compare, hmac_sha256, stripe_digest, DigestEncoding, StripeSignatureHeader,
};
use crate::domain::provider::Provider;

/// Allowed clock skew for Stripe timestamps in the future.
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Verifies that a payload was signed by a provider holding `secret`.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    /// Provider this verifier implements.
    fn provider(&self) -> Provider;

    /// Checks the signature and reports why it was rejected.
    fn check(&self, payload: &[u8], signature: &str, secret: &str)
        -> Result<(), VerificationError>;

    /// Returns true only when the signature is authentic.
    async fn verify(&self, payload: &[u8], signature: &str, secret: &str) -> bool {
        match self.check(payload, signature, secret) {
            Ok(()) => true,
            Err(err) => {
                log_rejection(self.provider(), &err);
                false
            }
        }
    }
}

pub(crate) fn log_rejection(provider: Provider, err: &VerificationError) {
    if err.is_local_misconfiguration() {
        tracing::error!(
            provider = %provider,
            error_kind = err.kind(),
            error = %err,
            "Webhook verification failed due to local configuration"
        );
    } else {
        tracing::warn!(
            provider = %provider,
            error_kind = err.kind(),
            error = %err,
            "Webhook signature rejected"
        );
    }
}

fn require_inputs<'a>(
    signature: &'a str,
    secret: &str,
) -> Result<&'a str, VerificationError> {
    if secret.is_empty() {
        return Err(VerificationError::MissingSecret);
    }
    let signature = signature.trim();
    if signature.is_empty() {
        return Err(VerificationError::MissingSignature);
    }
    Ok(signature)
}

/// Verifier for providers that send a single HMAC-SHA256 digest of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HmacDigestVerifier {
    provider: Provider,
    encoding: DigestEncoding,
}

impl HmacDigestVerifier {
    /// `X-Shopify-Hmac-Sha256`: base64 digest.
    pub fn shopify() -> Self {
        Self {
            provider: Provider::Shopify,
            encoding: DigestEncoding::Base64,
        }
    }

    /// GoDaddy: hex digest.
    pub fn godaddy() -> Self {
        Self {
            provider: Provider::GoDaddy,
            encoding: DigestEncoding::Hex,
        }
    }

    /// `x-square-hmacsha256-signature`: base64 digest of the body.
    pub fn square() -> Self {
        Self {
            provider: Provider::Square,
            encoding: DigestEncoding::Base64,
        }
    }

    /// `X-WC-Webhook-Signature`: base64 digest.
    pub fn woocommerce() -> Self {
        Self {
            provider: Provider::WooCommerce,
            encoding: DigestEncoding::Base64,
        }
    }

    pub fn encoding(&self) -> DigestEncoding {
        self.encoding
    }
}

#[async_trait]
impl SignatureVerifier for HmacDigestVerifier {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn check(
        &self,
        payload: &[u8],
        signature: &str,
        secret: &str,
    ) -> Result<(), VerificationError> {
        let signature = require_inputs(signature, secret)?;
        let provided = self.encoding.decode(signature)?;
        let expected = hmac_sha256(secret, &[payload])?;

        if constant_time_compare(&expected, &provided) {
            Ok(())
        } else {
            Err(VerificationError::SignatureMismatch)
        }
    }
}

/// Verifier for the composite `Stripe-Signature` header.
///
/// Timestamp freshness is only enforced when a tolerance is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripeVerifier {
    tolerance_secs: Option<i64>,
}

impl StripeVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects events older than `secs` or more than a minute in the future.
    pub fn with_tolerance(mut self, secs: i64) -> Self {
        self.tolerance_secs = Some(secs);
        self
    }

    pub fn tolerance_secs(&self) -> Option<i64> {
        self.tolerance_secs
    }

    fn validate_timestamp(&self, timestamp: i64) -> Result<(), VerificationError> {
        let Some(tolerance) = self.tolerance_secs else {
            return Ok(());
        };

        let now = chrono::Utc::now().timestamp();
        match now.checked_sub(timestamp) {
            Some(age) if (-MAX_CLOCK_SKEW_SECS..=tolerance).contains(&age) => Ok(()),
            _ => Err(VerificationError::TimestampOutOfRange {
                age_secs: now.saturating_sub(timestamp),
            }),
        }
    }
}

#[async_trait]
impl SignatureVerifier for StripeVerifier {
    fn provider(&self) -> Provider {
        Provider::Stripe
    }

    fn check(
        &self,
        payload: &[u8],
        signature: &str,
        secret: &str,
    ) -> Result<(), VerificationError> {
        let signature = require_inputs(signature, secret)?;
        let header = StripeSignatureHeader::parse(signature)?;
        self.validate_timestamp(header.timestamp)?;

        let expected = stripe_digest(secret, &header.signed_timestamp, payload)?;

        // Evaluate every candidate so the match position is not observable
        let matched = header
            .v1_signatures
            .iter()
            .fold(false, |acc, candidate| {
                constant_time_compare(&expected, candidate) | acc
            });

        if matched {
            Ok(())
        } else {
            Err(VerificationError::SignatureMismatch)
        }
    }
}

/// Default verifier for a provider.
pub fn verifier_for(provider: Provider) -> Arc<dyn SignatureVerifier> {
    match provider {
        Provider::Shopify => Arc::new(HmacDigestVerifier::shopify()),
        Provider::GoDaddy => Arc::new(HmacDigestVerifier::godaddy()),
        Provider::Stripe => Arc::new(StripeVerifier::new()),
        Provider::Square => Arc::new(HmacDigestVerifier::square()),
        Provider::WooCommerce => Arc::new(HmacDigestVerifier::woocommerce()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::webhooks::signature::{sign, stripe_signature_header};
    use proptest::prelude::*;

    const TEST_SECRET: &str = "whsec_test_secret_12345";
    const PAYLOAD: &[u8] = br#"{"id":"evt_123","type":"order.created"}"#;

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    // ══════════════════════════════════════════════════════════════
    // Single-digest providers
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn shopify_fixture_verifies() {
        let verifier = HmacDigestVerifier::shopify();
        let signature = sign(Provider::Shopify, br#"{"id":1}"#, "s3cr3t").unwrap();

        assert!(verifier.verify(br#"{"id":1}"#, &signature, "s3cr3t").await);
        assert!(!verifier.verify(br#"{"id":1}"#, "bogus", "s3cr3t").await);
    }

    #[tokio::test]
    async fn godaddy_expects_hex() {
        let verifier = HmacDigestVerifier::godaddy();
        let hex_sig = sign(Provider::GoDaddy, PAYLOAD, TEST_SECRET).unwrap();
        let base64_sig = sign(Provider::Shopify, PAYLOAD, TEST_SECRET).unwrap();

        assert!(verifier.verify(PAYLOAD, &hex_sig, TEST_SECRET).await);
        assert!(!verifier.verify(PAYLOAD, &base64_sig, TEST_SECRET).await);
    }

    #[tokio::test]
    async fn godaddy_accepts_uppercase_hex() {
        let verifier = HmacDigestVerifier::godaddy();
        let signature = sign(Provider::GoDaddy, PAYLOAD, TEST_SECRET)
            .unwrap()
            .to_uppercase();

        assert!(verifier.verify(PAYLOAD, &signature, TEST_SECRET).await);
    }

    #[test]
    fn signature_whitespace_is_trimmed() {
        let verifier = HmacDigestVerifier::woocommerce();
        let signature = sign(Provider::WooCommerce, PAYLOAD, TEST_SECRET).unwrap();

        assert_eq!(
            verifier.check(PAYLOAD, &format!("  {}\n", signature), TEST_SECRET),
            Ok(())
        );
    }

    #[test]
    fn wrong_secret_is_mismatch() {
        let verifier = HmacDigestVerifier::square();
        let signature = sign(Provider::Square, PAYLOAD, TEST_SECRET).unwrap();

        assert_eq!(
            verifier.check(PAYLOAD, &signature, "other_secret"),
            Err(VerificationError::SignatureMismatch)
        );
    }

    #[test]
    fn empty_secret_fails_closed() {
        let verifier = HmacDigestVerifier::shopify();
        let signature = sign(Provider::Shopify, PAYLOAD, "").unwrap();

        assert_eq!(
            verifier.check(PAYLOAD, &signature, ""),
            Err(VerificationError::MissingSecret)
        );
    }

    #[test]
    fn empty_signature_is_missing() {
        assert_eq!(
            HmacDigestVerifier::shopify().check(PAYLOAD, "", TEST_SECRET),
            Err(VerificationError::MissingSignature)
        );
    }

    #[test]
    fn garbage_signature_is_decode_error() {
        assert_eq!(
            HmacDigestVerifier::godaddy().check(PAYLOAD, "zz-not-hex", TEST_SECRET),
            Err(VerificationError::Decode { encoding: "hex" })
        );
    }

    #[test]
    fn truncated_signature_is_mismatch() {
        let signature = sign(Provider::GoDaddy, PAYLOAD, TEST_SECRET).unwrap();
        assert_eq!(
            HmacDigestVerifier::godaddy().check(PAYLOAD, &signature[..32], TEST_SECRET),
            Err(VerificationError::SignatureMismatch)
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Stripe
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn stripe_valid_signature_succeeds() {
        let header = stripe_signature_header(TEST_SECRET, now(), PAYLOAD).unwrap();
        assert!(StripeVerifier::new().verify(PAYLOAD, &header, TEST_SECRET).await);
    }

    #[test]
    fn stripe_old_fixture_passes_without_tolerance() {
        let header = stripe_signature_header(TEST_SECRET, 1_500_000_000, PAYLOAD).unwrap();
        assert_eq!(StripeVerifier::new().check(PAYLOAD, &header, TEST_SECRET), Ok(()));
    }

    #[test]
    fn stripe_old_timestamp_rejected_with_tolerance() {
        let header = stripe_signature_header(TEST_SECRET, now() - 600, PAYLOAD).unwrap();
        let result = StripeVerifier::new()
            .with_tolerance(300)
            .check(PAYLOAD, &header, TEST_SECRET);

        assert!(matches!(
            result,
            Err(VerificationError::TimestampOutOfRange { .. })
        ));
    }

    #[test]
    fn stripe_future_timestamp_rejected_with_tolerance() {
        let header = stripe_signature_header(TEST_SECRET, now() + 120, PAYLOAD).unwrap();
        let result = StripeVerifier::new()
            .with_tolerance(300)
            .check(PAYLOAD, &header, TEST_SECRET);

        assert!(matches!(
            result,
            Err(VerificationError::TimestampOutOfRange { .. })
        ));
    }

    #[test]
    fn stripe_small_clock_skew_allowed() {
        let header = stripe_signature_header(TEST_SECRET, now() + 30, PAYLOAD).unwrap();
        assert_eq!(
            StripeVerifier::new()
                .with_tolerance(300)
                .check(PAYLOAD, &header, TEST_SECRET),
            Ok(())
        );
    }

    #[test]
    fn stripe_extreme_timestamps_rejected_with_tolerance() {
        let verifier = StripeVerifier::new().with_tolerance(300);

        for ts in [i64::MIN, i64::MAX] {
            let header = format!("t={},v1={}", ts, "a".repeat(64));
            assert!(matches!(
                verifier.check(PAYLOAD, &header, TEST_SECRET),
                Err(VerificationError::TimestampOutOfRange { .. })
            ));
        }
    }

    #[tokio::test]
    async fn stripe_minimum_timestamp_verify_returns_false() {
        let header = format!("t={},v1={}", i64::MIN, "a".repeat(64));
        assert!(
            !StripeVerifier::new()
                .with_tolerance(300)
                .verify(b"{}", &header, "whsec")
                .await
        );
    }

    #[test]
    fn stripe_signs_timestamp_text_as_sent() {
        let ts = now();
        let padded = format!("0{}", ts);
        let digest = hex::encode(stripe_digest(TEST_SECRET, &padded, PAYLOAD).unwrap());
        let header = format!("t={},v1={}", padded, digest);

        assert_eq!(
            StripeVerifier::new()
                .with_tolerance(300)
                .check(PAYLOAD, &header, TEST_SECRET),
            Ok(())
        );
    }

    #[test]
    fn stripe_tolerates_trailing_comma_and_legacy_v0() {
        let header = stripe_signature_header(TEST_SECRET, now(), PAYLOAD).unwrap();

        for decorated in [
            format!("{},", header),
            format!("{},v0=xyz", header),
            format!("{},scheme", header),
        ] {
            assert_eq!(
                StripeVerifier::new().check(PAYLOAD, &decorated, TEST_SECRET),
                Ok(())
            );
        }
    }

    #[test]
    fn stripe_accepts_any_matching_v1() {
        let ts = now();
        let valid = stripe_signature_header(TEST_SECRET, ts, PAYLOAD).unwrap();
        let valid_sig = valid.split_once("v1=").unwrap().1;
        let header = format!("t={},v1={},v1={}", ts, "0".repeat(64), valid_sig);

        assert_eq!(StripeVerifier::new().check(PAYLOAD, &header, TEST_SECRET), Ok(()));
    }

    #[test]
    fn stripe_modified_payload_fails() {
        let header = stripe_signature_header(TEST_SECRET, now(), PAYLOAD).unwrap();
        assert_eq!(
            StripeVerifier::new().check(br#"{"id":"evt_456"}"#, &header, TEST_SECRET),
            Err(VerificationError::SignatureMismatch)
        );
    }

    #[test]
    fn stripe_header_missing_v1_is_malformed() {
        let header = format!("t={}", now());
        assert!(matches!(
            StripeVerifier::new().check(PAYLOAD, &header, TEST_SECRET),
            Err(VerificationError::MalformedHeader(_))
        ));
    }

    #[test]
    fn stripe_v0_alone_does_not_verify() {
        let ts = now();
        let digest = hex::encode(stripe_digest(TEST_SECRET, &ts.to_string(), PAYLOAD).unwrap());
        let header = format!("t={},v0={}", ts, digest);

        assert!(matches!(
            StripeVerifier::new().check(PAYLOAD, &header, TEST_SECRET),
            Err(VerificationError::MalformedHeader(_))
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // Factory
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verifier_for_reports_its_provider() {
        for provider in Provider::ALL {
            assert_eq!(verifier_for(provider).provider(), provider);
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Properties
    // ══════════════════════════════════════════════════════════════

    fn any_provider() -> impl Strategy<Value = Provider> {
        prop::sample::select(Provider::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn signed_payloads_verify(
            provider in any_provider(),
            payload in prop::collection::vec(any::<u8>(), 0..512),
            secret in "[a-zA-Z0-9_]{1,64}",
        ) {
            let signature = sign(provider, &payload, &secret).unwrap();
            prop_assert_eq!(verifier_for(provider).check(&payload, &signature, &secret), Ok(()));
        }

        #[test]
        fn tampered_payloads_fail(
            provider in any_provider(),
            payload in prop::collection::vec(any::<u8>(), 1..512),
            flip in any::<prop::sample::Index>(),
            secret in "[a-zA-Z0-9_]{1,64}",
        ) {
            let signature = sign(provider, &payload, &secret).unwrap();
            let mut tampered = payload.clone();
            let idx = flip.index(tampered.len());
            tampered[idx] ^= 0x01;

            prop_assert!(verifier_for(provider).check(&tampered, &signature, &secret).is_err());
        }

        #[test]
        fn garbage_signatures_never_panic(
            provider in any_provider(),
            payload in prop::collection::vec(any::<u8>(), 0..128),
            signature in ".{0,200}",
            secret in ".{0,64}",
        ) {
            let _ = verifier_for(provider).check(&payload, &signature, &secret);
        }

        #[test]
        fn stripe_tolerance_handles_any_timestamp(
            ts in any::<i64>(),
            digest in "[0-9a-f]{64}",
            tail in "(,[a-z0-9=]{0,12}){0,3}",
        ) {
            let header = format!("t={},v1={}{}", ts, digest, tail);
            let result = StripeVerifier::new().with_tolerance(300).check(PAYLOAD, &header, TEST_SECRET);
            prop_assert!(result.is_err());
        }

        #[test]
        fn stripe_tolerance_rejects_garbage_headers(
            payload in prop::collection::vec(any::<u8>(), 0..128),
            signature in ".{0,200}",
        ) {
            let _ = StripeVerifier::new().with_tolerance(300).check(&payload, &signature, TEST_SECRET);
        }
    }
}
