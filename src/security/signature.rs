//! Request signature verification.
//!
//! Callers behind the internal edge sign requests with
//! `X-Internal-Signature: <hex>` computed as HMAC-SHA256 over
//! `"<timestamp>.<raw body>"`. Verification is constant-time; a naive
//! equality check would leak timing usable to forge signatures byte by byte.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify a hex-encoded HMAC-SHA256 signature over `"<timestamp>.<body>"`.
pub fn verify(secret: &str, timestamp: i64, body: &[u8], signature_hex: &str) -> bool {
    let Ok(supplied) = hex::decode(signature_hex) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };

    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    mac.verify_slice(&supplied).is_ok()
}

/// Compute the hex signature for `"<timestamp>.<body>"`.
///
/// Used by tests and by operators generating signatures for manual calls.
pub fn sign(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
