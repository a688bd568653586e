//! Content checksums for version de-duplication
//!
//! A checksum is the hex encoding of the first 8 bytes (64 bits) of the
//! SHA-256 digest over the canonical JSON bytes of the form data. It is a
//! de-duplication key, not a security control.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Compute the 64-bit content checksum of a form-data value.
///
/// Identical form data always yields the same checksum (serde_json object
/// keys serialize in sorted order, so key insertion order does not matter).
pub fn checksum(form_data: &Value) -> String {
    let bytes = serde_json::to_vec(form_data).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}
