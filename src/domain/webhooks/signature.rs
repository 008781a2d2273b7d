//! HMAC-SHA256 primitives shared by the provider verifiers.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::VerificationError;
use crate::domain::provider::Provider;

type HmacSha256 = Hmac<Sha256>;

/// Text encoding a provider uses for the digest it sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestEncoding {
    Base64,
    Hex,
}

impl DigestEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            DigestEncoding::Base64 => "base64",
            DigestEncoding::Hex => "hex",
        }
    }

    pub fn encode(&self, digest: &[u8]) -> String {
        match self {
            DigestEncoding::Base64 => BASE64.encode(digest),
            DigestEncoding::Hex => hex::encode(digest),
        }
    }

    pub fn decode(&self, signature: &str) -> Result<Vec<u8>, VerificationError> {
        let decoded = match self {
            DigestEncoding::Base64 => BASE64.decode(signature).ok(),
            DigestEncoding::Hex => hex::decode(signature).ok(),
        };
        decoded.ok_or(VerificationError::Decode {
            encoding: self.name(),
        })
    }
}

/// Computes HMAC-SHA256 over the concatenation of `parts`.
pub fn hmac_sha256(secret: &str, parts: &[&[u8]]) -> Result<Vec<u8>, VerificationError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| VerificationError::InvalidKey)?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Constant-time comparison of two byte slices.
///
/// On a length mismatch the expected digest is still compared against
/// itself so both paths do the same amount of work.
pub fn constant_time_compare(expected: &[u8], provided: &[u8]) -> bool {
    if expected.len() != provided.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    expected.ct_eq(provided).into()
}

/// Parsed components of a Stripe-Signature header.
///
/// Format: `t=<timestamp>,v1=<hex>[,v1=<hex>...][,v0=<hex>]`
///
/// Elements without `=` are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripeSignatureHeader {
    /// Unix timestamp the signature was generated at.
    pub timestamp: i64,
    /// The `t` value exactly as sent; this is what Stripe signs.
    pub signed_timestamp: String,
    /// Every decodable v1 signature present (several during secret rolls).
    pub v1_signatures: Vec<Vec<u8>>,
    /// Legacy v0 signature, kept verbatim and never used for verification.
    pub v0_signature: Option<String>,
}

impl StripeSignatureHeader {
    pub fn parse(header: &str) -> Result<Self, VerificationError> {
        let header = header.trim();
        if header.is_empty() {
            return Err(VerificationError::MissingSignature);
        }

        let mut timestamp: Option<(i64, String)> = None;
        let mut v1_signatures = Vec::new();
        let mut undecodable_v1 = None;
        let mut v0_signature = None;

        for part in header.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "t" => {
                    let parsed = value.parse().map_err(|_| {
                        VerificationError::MalformedHeader("invalid timestamp".to_string())
                    })?;
                    timestamp = Some((parsed, value.to_string()));
                }
                "v1" => match DigestEncoding::Hex.decode(value) {
                    Ok(signature) => v1_signatures.push(signature),
                    Err(err) => undecodable_v1 = Some(err),
                },
                "v0" => v0_signature = Some(value.to_string()),
                // Unknown schemes are ignored for forward compatibility
                _ => {}
            }
        }

        let (timestamp, signed_timestamp) = timestamp
            .ok_or_else(|| VerificationError::MalformedHeader("missing timestamp".to_string()))?;
        if v1_signatures.is_empty() {
            return Err(undecodable_v1.unwrap_or_else(|| {
                VerificationError::MalformedHeader("missing v1 signature".to_string())
            }));
        }

        Ok(Self {
            timestamp,
            signed_timestamp,
            v1_signatures,
            v0_signature,
        })
    }
}

/// Digest Stripe signs: HMAC-SHA256 over `"{timestamp}.{payload}"`.
///
/// `timestamp` is the header's `t` text, unnormalized.
pub fn stripe_digest(
    secret: &str,
    timestamp: &str,
    payload: &[u8],
) -> Result<Vec<u8>, VerificationError> {
    hmac_sha256(secret, &[timestamp.as_bytes(), b".", payload])
}

/// Builds the `t=..,v1=..` header Stripe would send for `payload`.
pub fn stripe_signature_header(
    secret: &str,
    timestamp: i64,
    payload: &[u8],
) -> Result<String, VerificationError> {
    let digest = stripe_digest(secret, &timestamp.to_string(), payload)?;
    Ok(format!("t={},v1={}", timestamp, hex::encode(digest)))
}

/// Produces the signature `provider` would attach to `payload`.
///
/// Stripe headers are stamped with the current time.
pub fn sign(provider: Provider, payload: &[u8], secret: &str) -> Result<String, VerificationError> {
    match provider {
        Provider::Stripe => {
            stripe_signature_header(secret, chrono::Utc::now().timestamp(), payload)
        }
        Provider::GoDaddy => Ok(DigestEncoding::Hex.encode(&hmac_sha256(secret, &[payload])?)),
        Provider::Shopify | Provider::Square | Provider::WooCommerce => {
            Ok(DigestEncoding::Base64.encode(&hmac_sha256(secret, &[payload])?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Stripe header parsing
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_header_with_v1_only() {
        let header = format!("t=1234567890,v1={}", "a".repeat(64));

        let parsed = StripeSignatureHeader::parse(&header).unwrap();

        assert_eq!(parsed.timestamp, 1234567890);
        assert_eq!(parsed.signed_timestamp, "1234567890");
        assert_eq!(parsed.v1_signatures.len(), 1);
        assert_eq!(parsed.v1_signatures[0].len(), 32);
        assert!(parsed.v0_signature.is_none());
    }

    #[test]
    fn parse_header_with_v0_and_multiple_v1() {
        let header = format!(
            "t=1234567890, v1={}, v1={}, v0={}",
            "a".repeat(64),
            "c".repeat(64),
            "b".repeat(64)
        );

        let parsed = StripeSignatureHeader::parse(&header).unwrap();

        assert_eq!(parsed.v1_signatures.len(), 2);
        assert_eq!(parsed.v0_signature, Some("b".repeat(64)));
    }

    #[test]
    fn parse_header_keeps_non_hex_v0_verbatim() {
        let header = format!("t=1234567890,v1={},v0=xyz", "a".repeat(64));

        let parsed = StripeSignatureHeader::parse(&header).unwrap();

        assert_eq!(parsed.v1_signatures.len(), 1);
        assert_eq!(parsed.v0_signature.as_deref(), Some("xyz"));
    }

    #[test]
    fn parse_header_skips_elements_without_equals() {
        for header in [
            format!("t=1234567890,v1={},", "a".repeat(64)),
            format!("t=1234567890,scheme,v1={}", "a".repeat(64)),
        ] {
            let parsed = StripeSignatureHeader::parse(&header).unwrap();
            assert_eq!(parsed.v1_signatures.len(), 1);
        }
    }

    #[test]
    fn parse_header_keeps_timestamp_text() {
        let header = format!("t=0123,v1={}", "a".repeat(64));

        let parsed = StripeSignatureHeader::parse(&header).unwrap();

        assert_eq!(parsed.timestamp, 123);
        assert_eq!(parsed.signed_timestamp, "0123");
    }

    #[test]
    fn parse_header_skips_undecodable_v1_next_to_valid_one() {
        let header = format!("t=1234567890,v1=not_hex,v1={}", "a".repeat(64));

        let parsed = StripeSignatureHeader::parse(&header).unwrap();

        assert_eq!(parsed.v1_signatures.len(), 1);
    }

    #[test]
    fn parse_header_ignores_unknown_fields() {
        let header = format!("t=1234567890,v1={},v2=future", "a".repeat(64));
        assert!(StripeSignatureHeader::parse(&header).is_ok());
    }

    #[test]
    fn parse_header_missing_timestamp_fails() {
        let header = format!("v1={}", "a".repeat(64));
        assert!(matches!(
            StripeSignatureHeader::parse(&header),
            Err(VerificationError::MalformedHeader(_))
        ));
    }

    #[test]
    fn parse_header_missing_v1_fails() {
        assert!(matches!(
            StripeSignatureHeader::parse("t=1234567890"),
            Err(VerificationError::MalformedHeader(_))
        ));
    }

    #[test]
    fn parse_header_invalid_timestamp_fails() {
        let header = format!("t=yesterday,v1={}", "a".repeat(64));
        assert!(matches!(
            StripeSignatureHeader::parse(&header),
            Err(VerificationError::MalformedHeader(_))
        ));
    }

    #[test]
    fn parse_header_invalid_hex_fails() {
        assert_eq!(
            StripeSignatureHeader::parse("t=1234567890,v1=not_hex"),
            Err(VerificationError::Decode { encoding: "hex" })
        );
    }

    #[test]
    fn parse_header_without_any_pairs_fails() {
        assert!(matches!(
            StripeSignatureHeader::parse("t1234567890"),
            Err(VerificationError::MalformedHeader(_))
        ));
    }

    #[test]
    fn parse_empty_header_is_missing_signature() {
        assert_eq!(
            StripeSignatureHeader::parse("   "),
            Err(VerificationError::MissingSignature)
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Digests and encodings
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn hmac_matches_known_vector() {
        // RFC 4231 test case 2
        let digest = hmac_sha256("Jefe", &[b"what do ya want for nothing?"]).unwrap();
        assert_eq!(
            hex::encode(digest),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn hmac_over_parts_equals_hmac_over_concatenation() {
        let split = hmac_sha256("key", &[b"123", b".", b"body"]).unwrap();
        let joined = hmac_sha256("key", &[b"123.body"]).unwrap();
        assert_eq!(split, joined);
    }

    #[test]
    fn base64_decode_rejects_garbage() {
        assert_eq!(
            DigestEncoding::Base64.decode("bogus"),
            Err(VerificationError::Decode { encoding: "base64" })
        );
    }

    #[test]
    fn hex_encoding_round_trips() {
        let encoded = DigestEncoding::Hex.encode(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(encoded, "deadbeef");
        assert_eq!(
            DigestEncoding::Hex.decode(&encoded).unwrap(),
            vec![0xde, 0xad, 0xbe, 0xef]
        );
    }

    #[test]
    fn stripe_header_uses_timestamp_prefix() {
        let header = stripe_signature_header("whsec_test", 1700000000, b"{}").unwrap();
        let expected = hex::encode(hmac_sha256("whsec_test", &[b"1700000000.{}"]).unwrap());
        assert_eq!(header, format!("t=1700000000,v1={}", expected));
    }

    #[test]
    fn sign_uses_hex_for_godaddy_and_base64_for_shopify() {
        let godaddy = sign(Provider::GoDaddy, b"payload", "secret").unwrap();
        let shopify = sign(Provider::Shopify, b"payload", "secret").unwrap();

        assert_eq!(godaddy.len(), 64);
        assert!(godaddy.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(shopify.len(), 44);
        assert!(shopify.ends_with('='));
    }

    // ══════════════════════════════════════════════════════════════
    // Constant time comparison
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn constant_time_compare_equal_values() {
        assert!(constant_time_compare(&[1, 2, 3, 4, 5], &[1, 2, 3, 4, 5]));
    }

    #[test]
    fn constant_time_compare_different_values() {
        assert!(!constant_time_compare(&[1, 2, 3, 4, 5], &[1, 2, 3, 4, 6]));
    }

    #[test]
    fn constant_time_compare_different_lengths() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 3, 4]));
        assert!(!constant_time_compare(&[1, 2, 3], &[]));
    }

    #[test]
    fn constant_time_compare_empty_slices() {
        assert!(constant_time_compare(&[], &[]));
    }
}
