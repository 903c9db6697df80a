//! Signature verification for identity-provider webhooks.
//!
//! Deliveries are signed Svix-style: the signing secret is `whsec_` followed by
//! the base64 key, and each delivery carries three headers:
//!
//! * `svix-id` - unique message id
//! * `svix-timestamp` - unix seconds at signing time
//! * `svix-signature` - space separated `v1,<base64 HMAC-SHA256>` entries
//!
//! The MAC covers `"{id}.{timestamp}.{body}"`. Any one matching `v1` entry is
//! enough, which lets the provider rotate secrets. Timestamps outside a five
//! minute window are rejected to limit replays.

use axum::http::HeaderMap;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SECRET_PREFIX: &str = "whsec_";
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

const ID_HEADERS: [&str; 2] = ["svix-id", "webhook-id"];
const TIMESTAMP_HEADERS: [&str; 2] = ["svix-timestamp", "webhook-timestamp"];
const SIGNATURE_HEADERS: [&str; 2] = ["svix-signature", "webhook-signature"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Invalid webhook signing secret")]
    InvalidSecret,

    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("Invalid signature timestamp")]
    InvalidTimestamp,

    #[error("Message timestamp too old")]
    TimestampTooOld,

    #[error("Message timestamp too new")]
    TimestampTooNew,

    #[error("No matching signature found")]
    InvalidSignature,
}

fn header<'a>(headers: &'a HeaderMap, names: &[&'static str]) -> Result<&'a str, WebhookError> {
    names
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .ok_or(WebhookError::MissingHeader(names[0]))
}

/// Verifies webhook deliveries against one signing secret
#[derive(Clone)]
pub struct WebhookVerifier {
    mac: HmacSha256,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier").finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    /// Build from a `whsec_`-prefixed (or bare) base64 secret
    pub fn new(secret: &str) -> Result<Self, WebhookError> {
        let encoded = secret.trim();
        let encoded = encoded.strip_prefix(SECRET_PREFIX).unwrap_or(encoded);

        let key = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|_| WebhookError::InvalidSecret)?;
        if key.is_empty() {
            return Err(WebhookError::InvalidSecret);
        }

        let mac = HmacSha256::new_from_slice(&key).map_err(|_| WebhookError::InvalidSecret)?;
        Ok(Self { mac })
    }

    fn signed_content(&self, msg_id: &str, timestamp: &str, payload: &[u8]) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac
    }

    /// Signature header value for a payload, in the `v1,<base64>` form
    pub fn sign(&self, msg_id: &str, timestamp: i64, payload: &[u8]) -> String {
        let mac = self.signed_content(msg_id, &timestamp.to_string(), payload);
        format!("v1,{}", general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Verify a delivery against the current time
    pub fn verify(&self, headers: &HeaderMap, payload: &[u8]) -> Result<(), WebhookError> {
        self.verify_at(headers, payload, Utc::now().timestamp())
    }

    /// Verify a delivery as of `now` (unix seconds)
    pub fn verify_at(&self, headers: &HeaderMap, payload: &[u8], now: i64) -> Result<(), WebhookError> {
        let msg_id = header(headers, &ID_HEADERS)?;
        let timestamp_raw = header(headers, &TIMESTAMP_HEADERS)?;
        let signatures = header(headers, &SIGNATURE_HEADERS)?;

        let timestamp: i64 = timestamp_raw
            .trim()
            .parse()
            .map_err(|_| WebhookError::InvalidTimestamp)?;
        // Differences that overflow i64 are out of the window by definition
        if now
            .checked_sub(timestamp)
            .map_or(true, |age| age > TIMESTAMP_TOLERANCE_SECS)
        {
            return Err(WebhookError::TimestampTooOld);
        }
        if timestamp
            .checked_sub(now)
            .map_or(true, |lead| lead > TIMESTAMP_TOLERANCE_SECS)
        {
            return Err(WebhookError::TimestampTooNew);
        }

        let expected = self.signed_content(msg_id, timestamp_raw.trim(), payload);

        let matched = signatures
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == "v1")
            .filter_map(|(_, sig)| general_purpose::STANDARD.decode(sig).ok())
            // Constant-time comparison via the HMAC library
            .any(|sig| expected.clone().verify_slice(&sig).is_ok());

        if matched {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use proptest::prelude::*;

    // base64("jix-blog-test-secret")
    const SECRET: &str = "whsec_aml4LWJsb2ctdGVzdC1zZWNyZXQ=";
    const NOW: i64 = 1_750_000_000;

    fn signed_headers(verifier: &WebhookVerifier, payload: &[u8], timestamp: i64) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("svix-id", HeaderValue::from_static("msg_2abc"));
        headers.insert("svix-timestamp", HeaderValue::from_str(&timestamp.to_string()).unwrap());
        let signature = verifier.sign("msg_2abc", timestamp, payload);
        headers.insert("svix-signature", HeaderValue::from_str(&signature).unwrap());
        headers
    }

    #[test]
    fn test_valid_signature() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let payload = br#"{"type":"user.created","data":{"id":"user_1"}}"#;
        let headers = signed_headers(&verifier, payload, NOW);
        assert_eq!(verifier.verify_at(&headers, payload, NOW), Ok(()));
    }

    #[test]
    fn test_secret_without_prefix_is_accepted() {
        let with_prefix = WebhookVerifier::new(SECRET).unwrap();
        let bare = WebhookVerifier::new(SECRET.trim_start_matches(SECRET_PREFIX)).unwrap();
        assert_eq!(with_prefix.sign("m", NOW, b"x"), bare.sign("m", NOW, b"x"));
    }

    #[test]
    fn test_invalid_secret() {
        assert_eq!(WebhookVerifier::new("whsec_!!!").unwrap_err(), WebhookError::InvalidSecret);
        assert_eq!(WebhookVerifier::new("whsec_").unwrap_err(), WebhookError::InvalidSecret);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let headers = signed_headers(&verifier, b"original", NOW);
        assert_eq!(
            verifier.verify_at(&headers, b"tampered", NOW),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = WebhookVerifier::new(SECRET).unwrap();
        let other = WebhookVerifier::new("whsec_b3RoZXItc2VjcmV0").unwrap();
        let headers = signed_headers(&signer, b"payload", NOW);
        assert_eq!(
            other.verify_at(&headers, b"payload", NOW),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn test_any_matching_v1_entry_passes() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let mut headers = signed_headers(&verifier, b"payload", NOW);
        let valid = verifier.sign("msg_2abc", NOW, b"payload");
        let rotated = format!("v1,bm90LXRoZS1zaWduYXR1cmU= v2,ignored {}", valid);
        headers.insert("svix-signature", HeaderValue::from_str(&rotated).unwrap());
        assert_eq!(verifier.verify_at(&headers, b"payload", NOW), Ok(()));
    }

    #[test]
    fn test_timestamp_window() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();

        let old = signed_headers(&verifier, b"payload", NOW - TIMESTAMP_TOLERANCE_SECS - 1);
        assert_eq!(verifier.verify_at(&old, b"payload", NOW), Err(WebhookError::TimestampTooOld));

        let future = signed_headers(&verifier, b"payload", NOW + TIMESTAMP_TOLERANCE_SECS + 1);
        assert_eq!(verifier.verify_at(&future, b"payload", NOW), Err(WebhookError::TimestampTooNew));

        let edge = signed_headers(&verifier, b"payload", NOW - TIMESTAMP_TOLERANCE_SECS);
        assert_eq!(verifier.verify_at(&edge, b"payload", NOW), Ok(()));
    }

    #[test]
    fn test_extreme_timestamps_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();

        let mut headers = signed_headers(&verifier, b"payload", NOW);
        headers.insert("svix-timestamp", HeaderValue::from_str(&i64::MIN.to_string()).unwrap());
        assert_eq!(verifier.verify_at(&headers, b"payload", NOW), Err(WebhookError::TimestampTooOld));

        headers.insert("svix-timestamp", HeaderValue::from_str(&i64::MAX.to_string()).unwrap());
        assert_eq!(verifier.verify_at(&headers, b"payload", NOW), Err(WebhookError::TimestampTooNew));
    }

    #[test]
    fn test_missing_and_malformed_headers() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();

        let mut headers = signed_headers(&verifier, b"payload", NOW);
        headers.remove("svix-signature");
        assert_eq!(
            verifier.verify_at(&headers, b"payload", NOW),
            Err(WebhookError::MissingHeader("svix-signature"))
        );

        let mut headers = signed_headers(&verifier, b"payload", NOW);
        headers.insert("svix-timestamp", HeaderValue::from_static("yesterday"));
        assert_eq!(
            verifier.verify_at(&headers, b"payload", NOW),
            Err(WebhookError::InvalidTimestamp)
        );
    }

    #[test]
    fn test_unbranded_header_names() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("webhook-id", HeaderValue::from_static("msg_2abc"));
        headers.insert("webhook-timestamp", HeaderValue::from_str(&NOW.to_string()).unwrap());
        let signature = verifier.sign("msg_2abc", NOW, b"payload");
        headers.insert("webhook-signature", HeaderValue::from_str(&signature).unwrap());
        assert_eq!(verifier.verify_at(&headers, b"payload", NOW), Ok(()));
    }

    proptest! {
        #[test]
        fn prop_sign_verify_roundtrip(payload in any::<Vec<u8>>(), msg_id in "msg_[a-zA-Z0-9]{1,24}") {
            let verifier = WebhookVerifier::new(SECRET).unwrap();
            let mut headers = HeaderMap::new();
            headers.insert("svix-id", HeaderValue::from_str(&msg_id).unwrap());
            headers.insert("svix-timestamp", HeaderValue::from_str(&NOW.to_string()).unwrap());
            let signature = verifier.sign(&msg_id, NOW, &payload);
            headers.insert("svix-signature", HeaderValue::from_str(&signature).unwrap());
            prop_assert_eq!(verifier.verify_at(&headers, &payload, NOW), Ok(()));
        }

        #[test]
        fn prop_flipped_byte_rejected(payload in proptest::collection::vec(any::<u8>(), 1..256), idx in any::<usize>()) {
            let verifier = WebhookVerifier::new(SECRET).unwrap();
            let headers = signed_headers(&verifier, &payload, NOW);
            let mut tampered = payload.clone();
            let i = idx % tampered.len();
            tampered[i] ^= 0x01;
            prop_assert_eq!(
                verifier.verify_at(&headers, &tampered, NOW),
                Err(WebhookError::InvalidSignature)
            );
        }
    }
}
