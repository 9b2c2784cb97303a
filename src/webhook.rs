//! Webhook signature verification.
//!
//! Plop signs each webhook delivery with a signature header of the form
//! `t=<unix seconds>,v1=<hex>`, where `v1` is
//! `HMAC-SHA256(secret, "<t>.<raw body>")`. A signature is accepted only if
//! its timestamp is within [`SIGNATURE_TOLERANCE_SECS`] of the local clock,
//! in either direction.

use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed distance between the signature timestamp and now.
pub const SIGNATURE_TOLERANCE_SECS: u64 = 300;

/// A parsed signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp (seconds) the payload was signed at.
    pub timestamp: i64,
    /// Hex-encoded HMAC-SHA256 signature.
    pub v1: String,
}

impl FromStr for SignatureHeader {
    type Err = Error;

    /// Parse `t=<int>,v1=<hex>`. Unknown keys are ignored; the last
    /// occurrence of a key wins.
    fn from_str(header: &str) -> Result<Self> {
        let mut timestamp = None;
        let mut v1 = None;

        for part in header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            match key {
                "t" => {
                    let t = value.parse::<i64>().map_err(|_| Error::MalformedSignature)?;
                    timestamp = Some(t);
                }
                "v1" => v1 = Some(value.to_string()),
                _ => {}
            }
        }

        match (timestamp, v1) {
            (Some(timestamp), Some(v1)) => Ok(Self { timestamp, v1 }),
            _ => Err(Error::MalformedSignature),
        }
    }
}

/// Verify a webhook payload against the shared `secret`.
///
/// `body` must be the raw request body exactly as received, as bytes or text.
/// Returns
/// `Ok(false)` for a stale or future timestamp and for any signature mismatch;
/// returns [`Error::MalformedSignature`] only when the header cannot be parsed.
///
/// # Examples
/// ```
/// use plop_client::webhook::{sign, verify_signature};
///
/// let body = r#"{"event":"message.received"}"#;
/// let now = std::time::SystemTime::now()
///     .duration_since(std::time::UNIX_EPOCH)
///     .unwrap()
///     .as_secs() as i64;
/// let header = sign("whsec_test", body, now);
/// assert!(verify_signature("whsec_test", &header, body).unwrap());
/// ```
pub fn verify_signature(secret: &str, header: &str, body: impl AsRef<[u8]>) -> Result<bool> {
    verify_signature_at(secret, header, body, unix_now())
}

/// Like [`verify_signature`], with the current time given explicitly.
pub fn verify_signature_at(
    secret: &str,
    header: &str,
    body: impl AsRef<[u8]>,
    now: i64,
) -> Result<bool> {
    let header: SignatureHeader = header.parse()?;

    let age = now.abs_diff(header.timestamp);
    if age > SIGNATURE_TOLERANCE_SECS {
        debug!(age, "webhook signature outside tolerance");
        return Ok(false);
    }

    let Ok(provided) = hex::decode(&header.v1) else {
        return Ok(false);
    };

    // verify_slice compares in constant time; its only early exit is a
    // length check against the fixed 32-byte tag length.
    Ok(mac(secret, header.timestamp, body.as_ref())
        .verify_slice(&provided)
        .is_ok())
}

/// Produce a signature header for `body` at `timestamp`.
pub fn sign(secret: &str, body: impl AsRef<[u8]>, timestamp: i64) -> String {
    let tag = mac(secret, timestamp, body.as_ref()).finalize().into_bytes();
    format!("t={timestamp},v1={}", hex::encode(tag))
}

fn mac(secret: &str, timestamp: i64, body: &[u8]) -> HmacSha256 {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts keys of any length"),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    mac
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
