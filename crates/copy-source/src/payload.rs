//! The large JSON blob attached to every generated row.

use bytes::Bytes;
use serde::Serialize;

/// Character repeated to fill the payload string.
pub const FILLER: char = 'a';

/// Error type for payload generation.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// JSON encoding of the wrapper document failed
    #[error("failed generating json: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Document shape written into the data column.
#[derive(Serialize)]
struct PayloadDocument<'a> {
    str: &'a str,
}

/// Immutable, JSON-encoded byte buffer shared by every row of a run.
///
/// Cloning a `Payload` does not copy the bytes; all clones point at the same
/// allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    bytes: Bytes,
    filler_len: usize,
}

impl Payload {
    /// Wrap already-encoded bytes.
    pub fn from_encoded(bytes: impl Into<Bytes>, filler_len: usize) -> Self {
        Self {
            bytes: bytes.into(),
            filler_len,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the encoded document in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of filler characters inside the document.
    pub fn filler_len(&self) -> usize {
        self.filler_len
    }

    /// Whether both payloads reference the same underlying buffer.
    pub fn shares_buffer_with(&self, other: &Payload) -> bool {
        self.bytes.len() == other.bytes.len() && self.bytes.as_ptr() == other.bytes.as_ptr()
    }
}

/// Build the shared payload: `size` filler characters wrapped in
/// `{"str": ...}` and encoded as JSON.
pub fn generate_payload(size: usize) -> Result<Payload, PayloadError> {
    let filler = FILLER.to_string().repeat(size);
    let encoded = serde_json::to_vec(&PayloadDocument { str: &filler })?;

    tracing::debug!(
        "Generated payload: {} filler bytes, {} encoded bytes",
        size,
        encoded.len()
    );

    Ok(Payload::from_encoded(encoded, size))
}
