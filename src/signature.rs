//! Webhook signature verification.
//!
//! Inbound webhook deliveries carry an `X-GCX-Signature` header of the form
//! `t=<unix-ts>,v1=<hex-hmac>`, where the MAC is an HMAC-SHA256 over
//! `"{t}.{payload}"` keyed by the subscription's signing secret. Verify the
//! header before trusting the body.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Default replay window: deliveries older (or further in the future) than
/// five minutes are rejected.
pub const DEFAULT_MAX_AGE_SECS: u64 = 300;

/// Verifies an inbound webhook signature.
///
/// Returns `false` on any failure — malformed header, stale or future
/// timestamp, or MAC mismatch — and never errors. The MAC comparison is
/// constant-time, so it cannot leak the expected value byte by byte.
///
/// # Example
///
/// ```
/// use golden_codex::{generate_signature, verify_signature, DEFAULT_MAX_AGE_SECS};
///
/// let payload = r#"{"event":"job.completed"}"#;
/// let header = generate_signature(payload, "whsec_example", None);
/// assert!(verify_signature(payload, &header, "whsec_example", DEFAULT_MAX_AGE_SECS));
/// ```
pub fn verify_signature(
    payload: &str,
    signature_header: &str,
    secret: &str,
    max_age_secs: u64,
) -> bool {
    verify_at(payload, signature_header, secret, max_age_secs, unix_now())
}

/// Generates a signature header value for a payload.
///
/// Intended for integrators' tests; the service signs real deliveries.
/// When `timestamp` is `None` the current time is used.
pub fn generate_signature(payload: &str, secret: &str, timestamp: Option<i64>) -> String {
    let timestamp = timestamp.unwrap_or_else(unix_now);
    let mac = compute_mac(payload, secret, timestamp);
    format!("t={timestamp},v1={}", hex::encode(mac))
}

fn verify_at(
    payload: &str,
    signature_header: &str,
    secret: &str,
    max_age_secs: u64,
    now: i64,
) -> bool {
    let Some((timestamp, provided)) = parse_header(signature_header) else {
        return false;
    };

    // Rejects stale deliveries and clock-skewed future timestamps alike.
    if now.abs_diff(timestamp) > max_age_secs {
        return false;
    }

    let expected = compute_mac(payload, secret, timestamp);
    // subtle's slice comparison treats a length mismatch as unequal without
    // short-circuiting on content.
    bool::from(expected.as_slice().ct_eq(provided.as_slice()))
}

/// Parses `t=<ts>,v1=<hex>` into a timestamp and raw MAC bytes. Unknown
/// keys are ignored for forward compatibility.
fn parse_header(header: &str) -> Option<(i64, Vec<u8>)> {
    let mut timestamp = None;
    let mut mac = None;

    for part in header.split(',') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            "v1" => mac = hex::decode(value).ok(),
            _ => {}
        }
    }

    Some((timestamp?, mac?))
}

fn compute_mac(payload: &str, secret: &str, timestamp: i64) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}
