//! HMAC-SHA256 webhook signature validation.
//!
//! The platform signs the raw request body with the channel secret and sends
//! the base64-encoded digest in a request header. Verification recomputes
//! the digest over the exact body bytes and compares in constant time;
//! re-serializing the body would change the bytes and break the signature
//! even for semantically identical payloads.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Computes the base64-encoded HMAC-SHA256 digest of `payload`.
///
/// This is what a well-behaved platform puts in the signature header; tests
/// use it to build valid requests.
pub fn sign(secret: &str, payload: &[u8]) -> String {
    BASE64.encode(digest(secret, payload))
}

/// Verifies a supplied base64 signature against the payload.
///
/// A signature that is not valid base64, has the wrong digest length, or
/// does not match the computed digest all verify false; none of them panic.
/// The comparison runs over decoded digest bytes in constant time.
pub fn verify_signature(payload: &[u8], supplied: &str, secret: &str) -> bool {
    let Ok(supplied_digest) = BASE64.decode(supplied.trim()) else {
        return false;
    };
    timing_safe_eq(&supplied_digest, &digest(secret, payload))
}

fn digest(secret: &str, payload: &[u8]) -> [u8; 32] {
    // HMAC accepts keys of any length, so construction cannot fail.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC-SHA256 accepts keys of any length"));
    mac.update(payload);
    mac.finalize().into_bytes().into()
}

/// Constant-time byte comparison to avoid leaking partial-match information
/// through timing analysis.
fn timing_safe_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (a_byte, b_byte) in a.iter().zip(b.iter()) {
        result |= a_byte ^ b_byte;
    }

    result == 0
}
