//! Content digests for payload redaction
//!
//! Raw interaction content never enters a persisted log; only its digest
//! does. The digest is a deterministic one-way sha256 over the canonical
//! JSON encoding of the value, rendered as a lowercase hex string. Callers
//! that need the raw value later must retain it themselves.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Digest raw bytes to a lowercase hex string
pub fn digest_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Digest a plain string
pub fn digest_str(value: &str) -> String {
    digest_bytes(value.as_bytes())
}

/// Digest an arbitrary JSON value over its canonical encoding.
///
/// serde_json orders object keys deterministically, so the same value
/// always yields the same digest regardless of how it was built.
pub fn digest_value(value: &Value) -> String {
    // to_string on a Value cannot fail
    digest_str(&value.to_string())
}
