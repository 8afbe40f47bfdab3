//! # Preview token format
//!
//! Unpublished items must stay invisible to the public, but the merchant needs a way to share a draft page. A
//! preview token is a signed, self-contained capability binding a slug to its issue time:
//!
//! ```text
//!    {slug}.{unix seconds}.{base64url(hmac_sha256(secret, "{slug}.{unix seconds}"))}
//! ```
//!
//! Nothing is persisted; verification recomputes the signature from the process-wide secret. A token is valid iff
//! the signature matches and the issue time is within the max-age window. There is no revocation mechanism:
//! expiry is the only invalidation path.
//!
//! Callers on the product-page path collapse both failure reasons into the same denial outcome, so a probing
//! client cannot distinguish a bad signature from an expired token, or either from a nonexistent slug.

use chrono::Utc;
use hmac::{Hmac, Mac};
use lm_common::Secret;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Preview links are short-lived by design. One hour, matching the merchant-facing documentation.
pub const DEFAULT_PREVIEW_MAX_AGE_SECONDS: i64 = 3600;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreviewTokenError {
    #[error("The token signature is invalid")]
    InvalidSignature,
    #[error("The token expired {0}s ago")]
    Expired(i64),
}

#[derive(Clone)]
pub struct PreviewTokenSigner {
    secret: Secret<String>,
}

impl PreviewTokenSigner {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret }
    }

    /// Produces a token binding `slug` to the current time, signed with the process-wide secret.
    pub fn issue(&self, slug: &str) -> String {
        self.issue_at(slug, Utc::now().timestamp())
    }

    fn issue_at(&self, slug: &str, timestamp: i64) -> String {
        let payload = format!("{slug}.{timestamp}");
        let signature = base64::encode_config(self.signature_for(&payload), base64::URL_SAFE_NO_PAD);
        format!("{payload}.{signature}")
    }

    /// Recovers the slug from `token`, failing with `InvalidSignature` on any format or signature mismatch and
    /// with `Expired` once more than `max_age_seconds` have elapsed since issuance.
    pub fn verify(&self, token: &str, max_age_seconds: i64) -> Result<String, PreviewTokenError> {
        self.verify_at(token, max_age_seconds, Utc::now().timestamp())
    }

    fn verify_at(&self, token: &str, max_age_seconds: i64, now: i64) -> Result<String, PreviewTokenError> {
        // Split from the right so a slug containing '.' cannot shift the signature boundary
        let (payload, signature) = token.rsplit_once('.').ok_or(PreviewTokenError::InvalidSignature)?;
        let (slug, timestamp) = payload.rsplit_once('.').ok_or(PreviewTokenError::InvalidSignature)?;
        let sig_bytes = base64::decode_config(signature, base64::URL_SAFE_NO_PAD)
            .map_err(|_| PreviewTokenError::InvalidSignature)?;
        let mut mac = HmacSha256::new_from_slice(self.secret.reveal().as_bytes()).expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        mac.verify_slice(&sig_bytes).map_err(|_| PreviewTokenError::InvalidSignature)?;
        let timestamp = timestamp.parse::<i64>().map_err(|_| PreviewTokenError::InvalidSignature)?;
        let age = now - timestamp;
        if age > max_age_seconds {
            return Err(PreviewTokenError::Expired(age - max_age_seconds));
        }
        Ok(slug.to_string())
    }

    fn signature_for(&self, payload: &str) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.reveal().as_bytes()).expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}
