//! HMAC signing for webhook emission of signals.
//!
//! Payloads are signed with HMAC-SHA256 keyed by a shared secret; the
//! signature travels in the
//! [`X-AIP-Signature`](crate::aip::constants::AIP_SIGNATURE_HEADER) header
//! as `sha256=<lowercase-hex>`.  Verification recomputes the signature and
//! compares in constant time.
//!
//! # Example
//!
//! ```rust
//! use aip::aip::http::{sign_payload, verify_signature};
//!
//! let signature = sign_payload("shared-secret", "{\"proceed\":true}");
//! assert!(signature.starts_with("sha256="));
//! assert!(verify_signature("shared-secret", "{\"proceed\":true}", &signature));
//! assert!(!verify_signature("other-secret", "{\"proceed\":true}", &signature));
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Sign a payload with HMAC-SHA256.  Returns `sha256=<lowercase-hex>`.
pub fn sign_payload(secret: &str, payload: &str) -> String {
    // HMAC keys of any length are valid; new_from_slice only fails for
    // invalid output sizes, which cannot happen for SHA-256.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    let digest = mac.finalize().into_bytes();
    format!("sha256={:x}", digest)
}

/// Verify an HMAC-SHA256 signature in constant time.
///
/// subtle::ConstantTimeEq prevents a timing oracle on the signature bytes;
/// the optimizer cannot short-circuit ct_eq() the way it can with `==`.
pub fn verify_signature(secret: &str, payload: &str, signature: &str) -> bool {
    let expected = sign_payload(secret, payload);
    if expected.len() != signature.len() {
        return false;
    }
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
