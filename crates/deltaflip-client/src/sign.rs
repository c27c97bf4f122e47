//! Request signing for the Delta Exchange API.
//!
//! The signature payload is a raw concatenation with no separators:
//! `METHOD + timestamp + path + query + body`. Field order matters for
//! interop with the exchange, and the body string that goes into the
//! signature must be byte-identical to the body that is transmitted.

use crate::error::{ClientError, ClientResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Concatenate the fields the exchange signs over, in order.
///
/// `query` must include its leading `?` when non-empty; `body` is the
/// exact JSON text (empty string for GET).
pub fn signature_payload(
    method: &str,
    timestamp: &str,
    path: &str,
    query: &str,
    body: &str,
) -> String {
    format!("{method}{timestamp}{path}{query}{body}")
}

/// HMAC-SHA256 of `payload` keyed by the API secret, lower-case hex.
pub fn sign(secret: &str, payload: &str) -> ClientResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ClientError::Signing(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// A fully signed request, ready to transmit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Upper-case HTTP verb.
    pub method: String,
    pub path: String,
    /// Query string including leading `?`, or empty.
    pub query: String,
    /// Exact JSON text; always empty for GET.
    pub body: String,
    /// Unix seconds as a decimal string.
    pub timestamp: String,
    /// Lower-case hex HMAC-SHA256.
    pub signature: String,
}

impl SignedRequest {
    /// Sign a request at an explicit timestamp.
    ///
    /// GET requests have their body forced to the empty string no matter
    /// what the caller supplied: signing a body that is not sent (or
    /// sending one that was not signed) is rejected by the exchange.
    pub fn build(
        secret: &str,
        method: &str,
        path: &str,
        query: &str,
        body: String,
        timestamp: i64,
    ) -> ClientResult<Self> {
        let method = method.to_ascii_uppercase();
        let body = if method == "GET" { String::new() } else { body };
        let timestamp = timestamp.to_string();

        let payload = signature_payload(&method, &timestamp, path, query, &body);
        let signature = sign(secret, &payload)?;

        Ok(Self {
            method,
            path: path.to_string(),
            query: query.to_string(),
            body,
            timestamp,
            signature,
        })
    }

    /// Sign a request at the current wall clock.
    pub fn build_now(
        secret: &str,
        method: &str,
        path: &str,
        query: &str,
        body: String,
    ) -> ClientResult<Self> {
        Self::build(secret, method, path, query, body, chrono::Utc::now().timestamp())
    }

    /// Whether the request carries a body (and therefore a Content-Type).
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret";
    const TS: i64 = 1_700_000_000;

    #[test]
    fn test_signature_payload_concatenation() {
        let payload = signature_payload(
            "GET",
            "1700000000",
            "/v2/positions",
            "?underlying_asset_symbol=BTC",
            "",
        );
        assert_eq!(
            payload,
            "GET1700000000/v2/positions?underlying_asset_symbol=BTC"
        );
    }

    #[test]
    fn test_post_signature_known_vector() {
        let body =
            r#"{"product_symbol":"BTCUSD","side":"buy","order_type":"market_order","size":1}"#;
        let signed =
            SignedRequest::build(SECRET, "POST", "/v2/orders", "", body.to_string(), TS).unwrap();
        assert_eq!(
            signed.signature,
            "e275324bd80d20f1636300bee19ea2237920aca183b766e9bccb52b4a12ccfc2"
        );
        assert_eq!(signed.timestamp, "1700000000");
        assert_eq!(signed.body, body);
        assert!(signed.has_body());
    }

    #[test]
    fn test_get_signature_known_vector() {
        let signed = SignedRequest::build(
            SECRET,
            "GET",
            "/v2/positions",
            "?underlying_asset_symbol=BTC",
            String::new(),
            TS,
        )
        .unwrap();
        assert_eq!(
            signed.signature,
            "6bced92319ab58d06fef5d97b83798e4ccfb3e6ef670dc811d2c7fdd3551c185"
        );
    }

    #[test]
    fn test_get_forces_empty_body() {
        let signed = SignedRequest::build(
            SECRET,
            "get",
            "/v2/products",
            "",
            r#"{"sneaky":"payload"}"#.to_string(),
            TS,
        )
        .unwrap();
        assert_eq!(signed.method, "GET");
        assert_eq!(signed.body, "");
        assert!(!signed.has_body());

        // Identical to signing with no body at all.
        let reference =
            SignedRequest::build(SECRET, "GET", "/v2/products", "", String::new(), TS).unwrap();
        assert_eq!(signed.signature, reference.signature);
    }

    #[test]
    fn test_signature_is_deterministic() {
        let a = SignedRequest::build(SECRET, "POST", "/v2/orders", "", "{}".to_string(), TS)
            .unwrap();
        let b = SignedRequest::build(SECRET, "POST", "/v2/orders", "", "{}".to_string(), TS)
            .unwrap();
        assert_eq!(a.signature, b.signature);
    }

    #[test]
    fn test_signature_changes_with_each_input() {
        let base = SignedRequest::build(SECRET, "POST", "/v2/orders", "", "{}".to_string(), TS)
            .unwrap();

        let variants = [
            SignedRequest::build(SECRET, "DELETE", "/v2/orders", "", "{}".to_string(), TS),
            SignedRequest::build(SECRET, "POST", "/v2/orders/all", "", "{}".to_string(), TS),
            SignedRequest::build(SECRET, "POST", "/v2/orders", "?x=1", "{}".to_string(), TS),
            SignedRequest::build(SECRET, "POST", "/v2/orders", "", "{ }".to_string(), TS),
            SignedRequest::build(SECRET, "POST", "/v2/orders", "", "{}".to_string(), TS + 1),
            SignedRequest::build("other_secret", "POST", "/v2/orders", "", "{}".to_string(), TS),
        ];
        for variant in variants {
            assert_ne!(base.signature, variant.unwrap().signature);
        }
    }

    #[test]
    fn test_signature_is_lowercase_hex() {
        let signed =
            SignedRequest::build(SECRET, "GET", "/v2/products", "", String::new(), TS).unwrap();
        assert_eq!(signed.signature.len(), 64);
        assert!(signed
            .signature
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
