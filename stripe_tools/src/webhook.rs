//! Webhook signature verification.
//!
//! Stripe signs each webhook delivery with a shared secret over `"{timestamp}.{raw body}"` and puts the result in
//! the `Stripe-Signature` header as a comma-separated list of `t=<unix seconds>` and `v1=<hex hmac-sha256>` items
//! (multiple `v1` entries appear during secret rotation). Verification recomputes the HMAC over the raw bytes and
//! rejects deliveries whose timestamp falls outside the tolerance window, which bounds replay of captured
//! payloads.
//!
//! Nothing here looks at the event body beyond parsing it; classification happens in the event processor, after
//! the signature check has passed.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::data_objects::StripeEvent;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";
/// Stripe's own tooling tolerates 5 minutes of clock drift between signing and verification.
pub const SIGNATURE_TOLERANCE_SECONDS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    #[error("The signature header is missing or malformed. {0}")]
    MalformedHeader(String),
    #[error("The signature does not match the payload")]
    InvalidSignature,
    #[error("The signature timestamp is {0}s old, outside the tolerance window")]
    StaleTimestamp(i64),
    #[error("The payload is not a valid event. {0}")]
    InvalidPayload(String),
}

/// Verifies `sig_header` against the raw `payload` and deserializes the event. Any failure here must reject the
/// whole request before business logic runs.
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<StripeEvent, WebhookError> {
    verify_at(payload, sig_header, secret, Utc::now().timestamp())
}

fn verify_at(payload: &[u8], sig_header: &str, secret: &str, now: i64) -> Result<StripeEvent, WebhookError> {
    let (timestamp, signatures) = parse_signature_header(sig_header)?;
    let age = now - timestamp;
    if age.abs() > SIGNATURE_TOLERANCE_SECONDS {
        return Err(WebhookError::StaleTimestamp(age));
    }
    let mut signed_payload = format!("{timestamp}.").into_bytes();
    signed_payload.extend_from_slice(payload);
    let verified = signatures.iter().any(|sig| {
        let Ok(sig_bytes) = hex::decode(sig) else {
            return false;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
        mac.update(&signed_payload);
        // verify_slice is a constant-time comparison
        mac.verify_slice(&sig_bytes).is_ok()
    });
    if !verified {
        return Err(WebhookError::InvalidSignature);
    }
    serde_json::from_slice(payload).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
}

fn parse_signature_header(header: &str) -> Result<(i64, Vec<&str>), WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for item in header.split(',') {
        match item.trim().split_once('=') {
            Some(("t", t)) => {
                let t = t.parse::<i64>().map_err(|e| WebhookError::MalformedHeader(e.to_string()))?;
                timestamp = Some(t);
            },
            Some(("v1", sig)) => signatures.push(sig),
            // v0 and unknown schemes are ignored, as Stripe documents
            _ => {},
        }
    }
    let timestamp = timestamp.ok_or_else(|| WebhookError::MalformedHeader("no timestamp item".to_string()))?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedHeader("no v1 signature item".to_string()));
    }
    Ok((timestamp, signatures))
}

#[cfg(test)]
pub mod test_utils {
    use super::*;

    /// Produces a valid `Stripe-Signature` header for `payload` at the given timestamp.
    pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }
}
