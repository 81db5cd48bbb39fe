use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::TrigError;
use crate::serde_io::to_canonical_json_bytes;

/// Computes a stable SHA256 hex digest of the canonical JSON form of `value`.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, TrigError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
