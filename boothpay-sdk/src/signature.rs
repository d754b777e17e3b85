//! Request signing and verification for the payment provider API.
//!
//! Every request to the provider, and every notification it pushes back,
//! carries four headers:
//!
//! ```text
//! Client-Id:         {client_id}
//! Request-Id:        {uuid}
//! Request-Timestamp: {yyyy-mm-ddThh:mm:ssZ}
//! Signature:         HMACSHA256={base64_signature}
//! ```
//!
//! The signature is `HMAC-SHA256(component_string, secret)` where the
//! component string is:
//!
//! ```text
//! Client-Id:{client_id}
//! Request-Id:{request_id}
//! Request-Timestamp:{request_timestamp}
//! Request-Target:{path}
//! Digest:{base64(sha256(raw_body))}
//! ```
//!
//! The `Digest` line is present only for requests that carry a body.

use time::OffsetDateTime;
use time::macros::format_description;
use uuid::Uuid;

/// Header name for the provider-assigned client identifier.
pub const CLIENT_ID_HEADER: &str = "Client-Id";

/// Header name for the per-request nonce.
pub const REQUEST_ID_HEADER: &str = "Request-Id";

/// Header name for the request timestamp.
pub const REQUEST_TIMESTAMP_HEADER: &str = "Request-Timestamp";

/// Header name for the HMAC signature.
pub const SIGNATURE_HEADER: &str = "Signature";

/// Algorithm prefix of every signature value.
pub const SIGNATURE_ALGORITHM: &str = "HMACSHA256";

/// Errors produced by signature verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),
    #[error("unsupported signature algorithm")]
    AlgorithmMismatch,
    #[error("invalid signature")]
    SignatureMismatch,
}

/// Base64-encoded SHA-256 digest of the exact body bytes.
///
/// Callers must pass the bytes that are (or were) on the wire. Digesting a
/// re-serialized body is not equivalent.
pub fn digest(body: &[u8]) -> String {
    let hash = ring::digest::digest(&ring::digest::SHA256, body);
    fast32::base64::RFC4648.encode(hash.as_ref())
}

// ---------------------------------------------------------------------------
// RequestStamp — per-request nonce and timestamp
// ---------------------------------------------------------------------------

/// The request id and timestamp pair that goes into each signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestStamp {
    pub request_id: String,
    pub request_timestamp: String,
}

impl RequestStamp {
    /// A fresh UUIDv4 request id stamped with the current UTC time.
    pub fn fresh() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            request_timestamp: format_request_timestamp(OffsetDateTime::now_utc()),
        }
    }
}

/// Format a timestamp the way the provider expects: UTC, second precision,
/// literal `Z` suffix.
pub fn format_request_timestamp(at: OffsetDateTime) -> String {
    let at = at.to_offset(time::UtcOffset::UTC);
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
    // The description only contains numeric components, formatting cannot fail
    // for an in-range OffsetDateTime.
    at.format(&format).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// SignatureComponents — the canonical request descriptor
// ---------------------------------------------------------------------------

/// The canonical request descriptor that gets signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureComponents<'a> {
    pub client_id: &'a str,
    pub request_id: &'a str,
    pub request_timestamp: &'a str,
    pub request_target: &'a str,
    pub digest: Option<&'a str>,
}

impl<'a> SignatureComponents<'a> {
    /// Build the component string that is fed into the HMAC.
    pub fn canonical(&self) -> String {
        let mut component = format!(
            "Client-Id:{}\nRequest-Id:{}\nRequest-Timestamp:{}\nRequest-Target:{}",
            self.client_id, self.request_id, self.request_timestamp, self.request_target
        );
        if let Some(digest) = self.digest {
            component.push_str("\nDigest:");
            component.push_str(digest);
        }
        component
    }

    /// Sign the component string, returning the full `Signature` header value.
    pub fn sign(&self, secret: &[u8]) -> String {
        let tag = ring::hmac::sign(
            &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret),
            self.canonical().as_bytes(),
        );
        format!(
            "{SIGNATURE_ALGORITHM}={}",
            fast32::base64::RFC4648.encode(tag.as_ref())
        )
    }

    /// Check `received` against the signature of this descriptor.
    ///
    /// The tag is compared in constant time. Only the exact canonical
    /// base64 encoding of the expected tag is accepted.
    pub fn verify(&self, secret: &[u8], received: &str) -> Result<(), SignatureError> {
        let encoded = match received.split_once('=') {
            Some((SIGNATURE_ALGORITHM, encoded)) => encoded,
            _ => return Err(SignatureError::AlgorithmMismatch),
        };
        let tag = fast32::base64::RFC4648
            .decode_str(encoded)
            .map_err(|_| SignatureError::SignatureMismatch)?;

        ring::hmac::verify(
            &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret),
            self.canonical().as_bytes(),
            &tag,
        )
        .map_err(|_| SignatureError::SignatureMismatch)?;

        if fast32::base64::RFC4648.encode(&tag) != encoded {
            return Err(SignatureError::SignatureMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"SK-test-secret";

    fn components(digest: Option<&str>) -> SignatureComponents<'_> {
        SignatureComponents {
            client_id: "BRN-0001",
            request_id: "8b3c1f0e-5d7a-4a55-9b5b-0d9d3f6c2a11",
            request_timestamp: "2025-01-31T08:15:00Z",
            request_target: "/checkout/v1/payment",
            digest,
        }
    }

    #[test]
    fn test_canonical_without_digest() {
        assert_eq!(
            components(None).canonical(),
            "Client-Id:BRN-0001\n\
             Request-Id:8b3c1f0e-5d7a-4a55-9b5b-0d9d3f6c2a11\n\
             Request-Timestamp:2025-01-31T08:15:00Z\n\
             Request-Target:/checkout/v1/payment"
        );
    }

    #[test]
    fn test_canonical_appends_digest_line() {
        let canonical = components(Some("abc=")).canonical();
        assert!(canonical.ends_with("\nRequest-Target:/checkout/v1/payment\nDigest:abc="));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let body_digest = digest(br#"{"order":{"amount":1}}"#);
        let first = components(Some(&body_digest)).sign(SECRET);
        let second = components(Some(&body_digest)).sign(SECRET);
        assert_eq!(first, second);
        assert!(first.starts_with("HMACSHA256="));
    }

    #[test]
    fn test_single_body_byte_changes_signature() {
        let original = digest(br#"{"order":{"amount":1}}"#);
        let tampered = digest(br#"{"order":{"amount":2}}"#);
        assert_ne!(original, tampered);
        assert_ne!(
            components(Some(&original)).sign(SECRET),
            components(Some(&tampered)).sign(SECRET)
        );
    }

    #[test]
    fn test_digest_of_empty_body() {
        // SHA-256 of the empty string.
        assert_eq!(digest(b""), "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=");
    }

    #[test]
    fn test_verify_accepts_own_signature() {
        let signature = components(None).sign(SECRET);
        assert_eq!(components(None).verify(SECRET, &signature), Ok(()));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let signature = components(None).sign(b"another-secret");
        assert_eq!(
            components(None).verify(SECRET, &signature),
            Err(SignatureError::SignatureMismatch)
        );
    }

    #[test]
    fn test_verify_rejects_algorithm_prefix() {
        let signature = components(None).sign(SECRET);
        let relabelled = signature.replacen("HMACSHA256", "HMACSHA512", 1);
        assert_eq!(
            components(None).verify(SECRET, &relabelled),
            Err(SignatureError::AlgorithmMismatch)
        );
        assert_eq!(
            components(None).verify(SECRET, "garbage"),
            Err(SignatureError::AlgorithmMismatch)
        );
    }

    #[test]
    fn test_verify_rejects_non_base64_tag() {
        assert_eq!(
            components(None).verify(SECRET, "HMACSHA256=not*base64!"),
            Err(SignatureError::SignatureMismatch)
        );
        assert_eq!(
            components(None).verify(SECRET, "HMACSHA256="),
            Err(SignatureError::SignatureMismatch)
        );
    }

    #[test]
    fn test_verify_rejects_truncated_tag() {
        let signature = components(None).sign(SECRET);
        let truncated = &signature[..signature.len() - 4];
        assert_eq!(
            components(None).verify(SECRET, truncated),
            Err(SignatureError::SignatureMismatch)
        );
    }

    #[test]
    fn test_request_timestamp_format() {
        let at = time::macros::datetime!(2025-01-31 08:15:00.987 +07:00);
        assert_eq!(format_request_timestamp(at), "2025-01-31T01:15:00Z");
    }

    #[test]
    fn test_fresh_stamp_is_unique() {
        assert_ne!(RequestStamp::fresh().request_id, RequestStamp::fresh().request_id);
    }
}
