//! Content hashing.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical::to_canonical_string;
use crate::error::Result;

/// SHA-256 of the UTF-8 bytes of `text`, as 64 lowercase hex characters.
#[must_use]
pub fn sha256_hex(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Hashes the compact canonical serialization of `value`.
pub fn hash_value(value: &Value) -> Result<String> {
    Ok(sha256_hex(&to_canonical_string(value, 0)?))
}
