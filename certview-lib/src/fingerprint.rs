//! Certificate fingerprint (digest) computation.

use digest::Digest;

/// Compute the SHA-256 fingerprint of DER-encoded certificate bytes.
///
/// Returns a colon-separated uppercase hex string (e.g., "AB:CD:EF:...").
pub fn sha256_fingerprint(der_bytes: &[u8]) -> String {
    crate::util::hex_colon_upper(&sha2::Sha256::digest(der_bytes))
}
