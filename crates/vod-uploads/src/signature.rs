//! HMAC verification of provider webhook deliveries.
//!
//! The provider signs each delivery with a header of the form
//! `t=<unix seconds>,v1=<hex hmac>` where the MAC is HMAC-SHA256 over
//! `"{t}.{raw body}"` keyed with the shared webhook secret. Timestamp
//! freshness bounds replay of captured deliveries.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{UploadError, UploadResult};

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a delivery, in seconds.
pub const MAX_SIGNATURE_AGE_SECS: i64 = 300;

/// Parsed signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSignature {
    pub timestamp: i64,
    pub mac_hex: String,
}

impl WebhookSignature {
    /// Parse a `t=...,v1=...` header value.
    pub fn parse(header: &str) -> UploadResult<Self> {
        let mut timestamp = None;
        let mut mac_hex = None;
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => {
                    timestamp = Some(value.parse::<i64>().map_err(|_| {
                        UploadError::signature("non-numeric timestamp in signature header")
                    })?);
                }
                Some(("v1", value)) => mac_hex = Some(value.to_string()),
                _ => {}
            }
        }
        match (timestamp, mac_hex) {
            (Some(timestamp), Some(mac_hex)) => Ok(Self { timestamp, mac_hex }),
            _ => Err(UploadError::signature(
                "signature header missing 't' or 'v1' component",
            )),
        }
    }
}

fn decode_hex(s: &str) -> UploadResult<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(UploadError::signature("odd-length hex MAC"));
    }
    // Pairs of bytes, not char indices: a multibyte character in the
    // header must fail the parse instead of splitting a char boundary.
    s.as_bytes()
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|p| u8::from_str_radix(p, 16).ok())
                .ok_or_else(|| UploadError::signature("non-hex MAC"))
        })
        .collect()
}

/// Verify a webhook delivery against the shared secret.
///
/// `now_unix` is passed in rather than read from the clock so callers
/// and tests control freshness. Comparison of the MAC itself is
/// constant-time via the `hmac` crate's `verify_slice`.
pub fn verify_signature(
    secret: &str,
    header: &str,
    body: &[u8],
    now_unix: i64,
) -> UploadResult<()> {
    let signature = WebhookSignature::parse(header)?;

    let age = now_unix - signature.timestamp;
    if !(0..=MAX_SIGNATURE_AGE_SECS).contains(&age) {
        return Err(UploadError::signature("stale or future-dated delivery"));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| UploadError::signature("invalid webhook secret"))?;
    mac.update(signature.timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);

    let expected = decode_hex(&signature.mac_hex)?;
    mac.verify_slice(&expected)
        .map_err(|_| UploadError::signature("MAC mismatch"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, timestamp: i64, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        let hex: String = mac
            .finalize()
            .into_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        format!("t={timestamp},v1={hex}")
    }

    #[test]
    fn test_valid_signature_accepted() {
        let body = br#"{"type":"video.asset.ready"}"#;
        let header = sign("secret", 1_700_000_000, body);
        verify_signature("secret", &header, body, 1_700_000_010).unwrap();
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let body = b"{}";
        let header = sign("secret", 1_700_000_000, body);
        assert!(verify_signature("other", &header, body, 1_700_000_010).is_err());
    }

    #[test]
    fn test_tampered_body_rejected() {
        let header = sign("secret", 1_700_000_000, b"{\"a\":1}");
        assert!(verify_signature("secret", &header, b"{\"a\":2}", 1_700_000_010).is_err());
    }

    #[test]
    fn test_stale_delivery_rejected() {
        let body = b"{}";
        let header = sign("secret", 1_700_000_000, body);
        let too_late = 1_700_000_000 + MAX_SIGNATURE_AGE_SECS + 1;
        assert!(verify_signature("secret", &header, body, too_late).is_err());
    }

    #[test]
    fn test_future_dated_delivery_rejected() {
        let body = b"{}";
        let header = sign("secret", 1_700_000_100, body);
        assert!(verify_signature("secret", &header, body, 1_700_000_000).is_err());
    }

    #[test]
    fn test_non_ascii_mac_rejected() {
        // "€a" is 4 bytes; byte-offset slicing would split the euro
        // sign mid-character.
        let result = verify_signature("secret", "t=1700000000,v1=€a", b"{}", 1_700_000_010);
        assert!(result.is_err());

        let result = verify_signature("secret", "t=1700000000,v1=zz", b"{}", 1_700_000_010);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_header_rejected() {
        assert!(WebhookSignature::parse("v1=abcd").is_err());
        assert!(WebhookSignature::parse("t=notanumber,v1=abcd").is_err());
        let parsed = WebhookSignature::parse("t=5,v1=abcd").unwrap();
        assert_eq!(parsed.timestamp, 5);
        assert_eq!(parsed.mac_hex, "abcd");
    }
}
