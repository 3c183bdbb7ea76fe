//! Mercado Pago webhook notifications and signature verification.
//!
//! Mercado Pago signs each notification with the `x-signature` header,
//! `ts=<timestamp>,v1=<hex hmac>`. The HMAC-SHA256 is computed over the
//! manifest `id:<data.id>;request-id:<x-request-id>;ts:<ts>;`, leaving out
//! the parts whose values were not sent. The id is the `data.id` query
//! parameter of the notification URL, not the one in the body.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

/// Signature header sent by Mercado Pago.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Request id header sent by Mercado Pago.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Query parameters of a webhook notification URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default, rename = "data.id")]
    pub data_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// A webhook notification body. Only the fields we log are decoded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Notification {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub data: Option<NotificationData>,
}

/// The resource a notification refers to.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationData {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
}

impl Notification {
    /// Id of the referenced resource.
    #[must_use]
    pub fn data_id(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.id.as_deref())
    }

    /// Whether this notification is about a payment.
    #[must_use]
    pub fn is_payment(&self) -> bool {
        self.kind.as_deref() == Some("payment")
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Webhook verification errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("missing x-signature header")]
    MissingSignature,
    #[error("malformed x-signature header")]
    MalformedSignature,
    #[error("signature mismatch")]
    SignatureMismatch,
}

/// Split `ts=...,v1=...` into its timestamp and hash.
fn parse_signature_header(header: &str) -> Option<(&str, &str)> {
    let mut ts = None;
    let mut v1 = None;
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("ts", value)) => ts = Some(value.trim()),
            Some(("v1", value)) => v1 = Some(value.trim()),
            _ => {}
        }
    }
    Some((ts?, v1?))
}

/// Build the string that is signed.
fn manifest(data_id: Option<&str>, request_id: Option<&str>, ts: &str) -> String {
    let mut manifest = String::new();
    if let Some(id) = data_id.filter(|id| !id.is_empty()) {
        manifest.push_str(&format!("id:{};", manifest_id(id)));
    }
    if let Some(request_id) = request_id.filter(|r| !r.is_empty()) {
        manifest.push_str(&format!("request-id:{request_id};"));
    }
    manifest.push_str(&format!("ts:{ts};"));
    manifest
}

/// Alphanumeric ids are signed in lower case, anything else as sent.
fn manifest_id(id: &str) -> String {
    if id.chars().all(|c| c.is_ascii_alphanumeric()) {
        id.to_ascii_lowercase()
    } else {
        id.to_string()
    }
}

/// Compute the hex HMAC-SHA256 of `message`.
fn sign(secret: &SecretString, message: &str) -> Result<String, WebhookError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| WebhookError::MalformedSignature)?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a notification's `x-signature` header.
///
/// `data_id` is the `data.id` query parameter of the notification URL.
///
/// # Errors
///
/// Returns `WebhookError` when the header is missing, malformed or does not
/// match.
pub fn verify_signature(
    secret: &SecretString,
    signature_header: Option<&str>,
    request_id: Option<&str>,
    data_id: Option<&str>,
) -> Result<(), WebhookError> {
    let header = signature_header.ok_or(WebhookError::MissingSignature)?;
    let (ts, v1) = parse_signature_header(header).ok_or(WebhookError::MalformedSignature)?;

    let expected = sign(secret, &manifest(data_id, request_id, ts))?;

    if constant_time_compare(&expected, &v1.to_lowercase()) {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

/// Constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Produce a valid `x-signature` header value.
    pub(crate) fn signature_for(
        secret: &str,
        data_id: &str,
        request_id: &str,
        ts: &str,
    ) -> String {
        let secret = SecretString::from(secret);
        let v1 = sign(&secret, &manifest(Some(data_id), Some(request_id), ts)).unwrap();
        format!("ts={ts},v1={v1}")
    }

    #[test]
    fn test_manifest_format() {
        assert_eq!(
            manifest(Some("ABC123"), Some("req-1"), "1704908010"),
            "id:abc123;request-id:req-1;ts:1704908010;"
        );
        assert_eq!(manifest(None, None, "1"), "ts:1;");
    }

    #[test]
    fn test_manifest_id_lowercases_only_alphanumeric_ids() {
        assert_eq!(manifest_id("ABC123"), "abc123");
        assert_eq!(manifest_id("123456"), "123456");
        assert_eq!(manifest_id("Pay-ABC_1"), "Pay-ABC_1");
        assert_eq!(
            manifest(Some("Pay-ABC_1"), None, "1"),
            "id:Pay-ABC_1;ts:1;"
        );
    }

    #[test]
    fn test_verify_accepts_uppercase_query_id() {
        let header = signature_for("mp-webhook-key", "abc123", "req-1", "1704908010");
        let secret = SecretString::from("mp-webhook-key");
        assert_eq!(
            verify_signature(&secret, Some(&header), Some("req-1"), Some("ABC123")),
            Ok(())
        );
    }

    #[test]
    fn test_notification_query_fields() {
        let uri: axum::http::Uri = "/api/webhook?data.id=ABC123&type=payment".parse().unwrap();
        let axum::extract::Query(query) =
            axum::extract::Query::<NotificationQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.data_id.as_deref(), Some("ABC123"));
        assert_eq!(query.kind.as_deref(), Some("payment"));
    }

    #[test]
    fn test_parse_signature_header() {
        assert_eq!(
            parse_signature_header("ts=1704908010, v1=deadbeef"),
            Some(("1704908010", "deadbeef"))
        );
        assert_eq!(parse_signature_header("v1=deadbeef"), None);
        assert_eq!(parse_signature_header(""), None);
    }

    #[test]
    fn test_verify_valid_signature() {
        let header = signature_for("mp-webhook-key", "123456", "req-1", "1704908010");
        let secret = SecretString::from("mp-webhook-key");
        assert_eq!(
            verify_signature(&secret, Some(&header), Some("req-1"), Some("123456")),
            Ok(())
        );
    }

    #[test]
    fn test_verify_rejects_tampered_id() {
        let header = signature_for("mp-webhook-key", "123456", "req-1", "1704908010");
        let secret = SecretString::from("mp-webhook-key");
        assert_eq!(
            verify_signature(&secret, Some(&header), Some("req-1"), Some("999999")),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_verify_missing_and_malformed() {
        let secret = SecretString::from("mp-webhook-key");
        assert_eq!(
            verify_signature(&secret, None, None, None),
            Err(WebhookError::MissingSignature)
        );
        assert_eq!(
            verify_signature(&secret, Some("garbage"), None, None),
            Err(WebhookError::MalformedSignature)
        );
    }

    #[test]
    fn test_notification_numeric_id() {
        let n: Notification =
            serde_json::from_str(r#"{"type":"payment","action":"payment.created","data":{"id":123456}}"#)
                .unwrap();
        assert!(n.is_payment());
        assert_eq!(n.data_id(), Some("123456"));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "ab"));
    }
}
