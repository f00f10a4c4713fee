//! Notification signature verification.
//!
//! The notifier signs every delivery with HMAC-SHA512 over the raw
//! body bytes, keyed by a shared secret, and sends the hex digest in
//! the `x-notification-signature` header. Verification must run over
//! the exact bytes as transmitted; re-serializing the payload changes
//! the digest.

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the claimed hex digest.
pub const SIGNATURE_HEADER: &str = "x-notification-signature";

/// Verify a claimed signature against the raw body.
///
/// The comparison is constant-time (`Mac::verify_slice`). A missing,
/// non-hex, or wrong-length claim is simply not authentic.
pub fn verify_signature(secret: &[u8], body: &[u8], claimed: &str) -> bool {
    let Ok(digest) = hex::decode(claimed.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha512::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&digest).is_ok()
}

/// Hex HMAC-SHA512 digest of `body` under `secret`.
///
/// The counterpart of [`verify_signature`], used by tests and tooling
/// that need to produce deliveries gantry will accept.
pub fn sign(secret: &[u8], body: &[u8]) -> String {
    let mut mac =
        HmacSha512::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
