//! Unsigned reference encoder.
//!
//! Produces `base64url(header).base64url(claims).` with an empty signature
//! segment and `alg: none`. It provides no integrity and is meant for tests,
//! local tooling and as the reference plain encoder.

use crate::claims::ClaimPayload;
use crate::encoder::JwtEncoder;
use crate::error::{DecodeFailure, TokenError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::{json, Value};

/// Plain encoder without a signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsignedEncoder;

impl UnsignedEncoder {
    /// Create a new unsigned encoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn decode_segment(segment: &str, what: &str) -> Result<Value, DecodeFailure> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| DecodeFailure::Malformed(format!("Invalid base64 in {what}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| DecodeFailure::Malformed(format!("Invalid JSON in {what}")))
}

impl JwtEncoder for UnsignedEncoder {
    fn encode(&self, claims: &ClaimPayload) -> Result<String, TokenError> {
        let header = json!({ "alg": "none", "typ": "JWT" });
        let header = serde_json::to_vec(&header)
            .map_err(|e| TokenError::Encoding(format!("Header serialization failed: {e}")))?;
        let payload = serde_json::to_vec(claims)
            .map_err(|e| TokenError::Encoding(format!("Claims serialization failed: {e}")))?;

        Ok(format!(
            "{}.{}.",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        ))
    }

    fn decode(&self, token: &str) -> Result<ClaimPayload, DecodeFailure> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(DecodeFailure::Malformed(
                "Expected three token segments".to_string(),
            ));
        };

        if !signature.is_empty() {
            return Err(DecodeFailure::InvalidSignature);
        }

        match decode_segment(header, "header")? {
            Value::Object(header) if header.get("alg") == Some(&json!("none")) => {}
            _ => {
                return Err(DecodeFailure::InvalidClaims(
                    "Unexpected token algorithm".to_string(),
                ))
            }
        }

        match decode_segment(payload, "claims")? {
            Value::Object(claims) => Ok(claims),
            _ => Err(DecodeFailure::Malformed(
                "Claims are not a JSON object".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> ClaimPayload {
        let mut claims = ClaimPayload::new();
        claims.insert("roles".to_string(), json!(["ROLE_USER"]));
        claims.insert("username".to_string(), json!("alice"));
        claims
    }

    #[test]
    fn test_encode_token_shape() {
        let token = UnsignedEncoder::new().encode(&claims()).unwrap();

        assert_eq!(token.split('.').count(), 3);
        assert!(token.ends_with('.'));
    }

    #[test]
    fn test_decode_returns_claims_in_order() {
        let encoder = UnsignedEncoder::new();
        let token = encoder.encode(&claims()).unwrap();
        let decoded = encoder.decode(&token).unwrap();

        assert_eq!(decoded, claims());
        let keys: Vec<&str> = decoded.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["roles", "username"]);
    }

    #[test]
    fn test_decode_wrong_segment_count() {
        let encoder = UnsignedEncoder::new();

        assert!(matches!(
            encoder.decode("only.two"),
            Err(DecodeFailure::Malformed(_))
        ));
        assert!(matches!(
            encoder.decode("a.b.c.d"),
            Err(DecodeFailure::Malformed(_))
        ));
        assert!(matches!(encoder.decode(""), Err(DecodeFailure::Malformed(_))));
    }

    #[test]
    fn test_decode_rejects_signature_segment() {
        let encoder = UnsignedEncoder::new();
        let token = format!("{}forged", encoder.encode(&claims()).unwrap());

        assert_eq!(encoder.decode(&token), Err(DecodeFailure::InvalidSignature));
    }

    #[test]
    fn test_decode_rejects_bad_base64_and_json() {
        let encoder = UnsignedEncoder::new();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);

        let bad_base64 = format!("{header}.!!!.");
        assert!(matches!(
            encoder.decode(&bad_base64),
            Err(DecodeFailure::Malformed(_))
        ));

        let not_object = format!("{header}.{}.", URL_SAFE_NO_PAD.encode(b"[1,2]"));
        assert!(matches!(
            encoder.decode(&not_object),
            Err(DecodeFailure::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_other_algorithms() {
        let encoder = UnsignedEncoder::new();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"x"}"#);

        assert!(matches!(
            encoder.decode(&format!("{header}.{payload}.")),
            Err(DecodeFailure::InvalidClaims(_))
        ));
    }
}
