//! services/lexicon/src/adapters/blob.rs
//!
//! Encoding of the `phonetics` / `meanings` JSONB columns.
//!
//! Each column holds `{"version": 1, "items": [...]}`. Rows written before the
//! envelope existed hold a bare JSON array, which still decodes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const BLOB_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("unsupported blob version {0}")]
    UnsupportedVersion(u32),
    #[error("malformed blob: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct EnvelopeOut<'a, T> {
    version: u32,
    items: &'a [T],
}

#[derive(Deserialize)]
struct EnvelopeIn<T> {
    version: u32,
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

pub fn encode<T: Serialize>(items: &[T]) -> Result<Value, BlobError> {
    Ok(serde_json::to_value(EnvelopeOut {
        version: BLOB_VERSION,
        items,
    })?)
}

pub fn decode<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, BlobError> {
    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }
    let envelope: EnvelopeIn<T> = serde_json::from_value(value)?;
    if envelope.version != BLOB_VERSION {
        return Err(BlobError::UnsupportedVersion(envelope.version));
    }
    Ok(envelope.items)
}
