//! Webhook signature verification.
//!
//! Stripe signs `"{timestamp}.{payload}"` with HMAC-SHA256 and sends
//! `Stripe-Signature: t=<timestamp>,v1=<hex>[,v1=<hex>...]`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{Event, StripeError};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook, in seconds.
pub const TOLERANCE_SECS: i64 = 300;

/// Verify a webhook signature header against the raw payload.
///
/// # Errors
///
/// Returns `StripeError::InvalidSignature` if the header is malformed, the
/// timestamp is outside the tolerance, or no `v1` signature matches.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), StripeError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| StripeError::InvalidSignature("missing timestamp".to_owned()))?;
    if signatures.is_empty() {
        return Err(StripeError::InvalidSignature("missing v1 signature".to_owned()));
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| StripeError::InvalidSignature("invalid timestamp".to_owned()))?;
    if now.abs_diff(ts) > TOLERANCE_SECS.unsigned_abs() {
        return Err(StripeError::InvalidSignature("timestamp outside tolerance".to_owned()));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| StripeError::InvalidSignature(e.to_string()))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    // verify_slice compares in constant time
    let matched = signatures.iter().any(|sig| {
        hex::decode(sig).is_ok_and(|bytes| mac.clone().verify_slice(&bytes).is_ok())
    });
    if !matched {
        return Err(StripeError::InvalidSignature("signature mismatch".to_owned()));
    }

    Ok(())
}

/// Verify and decode a webhook event.
///
/// # Errors
///
/// Returns `StripeError::InvalidSignature` if verification fails, or
/// `StripeError::Parse` if the payload is not an event.
pub fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<Event, StripeError> {
    verify_signature(payload, header, secret, now)?;
    serde_json::from_slice(payload).map_err(|e| StripeError::Parse(e.to_string()))
}
