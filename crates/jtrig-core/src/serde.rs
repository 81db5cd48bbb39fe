//! JSON and YAML encoding used by the store, the card and hashing.

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::{ErrorInfo, TrigError};

fn serde_error(code: &str, err: impl ToString) -> TrigError {
    TrigError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Compact JSON with object keys in sorted order, so equal values give equal bytes.
///
/// Keys are ordered by the intermediate `serde_json::Value`, whose map is a
/// `BTreeMap` unless the `preserve_order` feature of serde_json is enabled.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, TrigError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json_serialize", err))?;
    serde_json::to_vec(&value).map_err(|err| serde_error("json_write", err))
}

/// Decodes JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, TrigError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json_deserialize", err))
}

/// Encodes YAML, used for cards written back to disk.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, TrigError> {
    serde_yaml::to_string(value).map_err(|err| serde_error("yaml_serialize", err))
}

/// Decodes YAML bytes.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, TrigError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("yaml_deserialize", err))
}
