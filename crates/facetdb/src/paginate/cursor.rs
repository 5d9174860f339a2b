///
/// Cursor codec.
///
/// This module owns the opaque wire-token format used for pagination
/// cursors: a CBOR map from cursor field to record value, hex-encoded.
/// It intentionally contains only token encoding/decoding logic.
///
use crate::{
    direction::Direction,
    error::{EngineError, ErrorClass, ErrorOrigin},
    traits::Record,
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Untrusted tokens are bounded by decoded payload size before the CBOR
// layer ever sees them.
const MAX_CURSOR_PAYLOAD_BYTES: usize = 4 * 1024;

///
/// CursorError
///

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum CursorError {
    #[error("cursor token is empty")]
    Empty,

    #[error("cursor token payload exceeds {max} bytes: {bytes}", max = MAX_CURSOR_PAYLOAD_BYTES)]
    TooLong { bytes: usize },

    #[error("cursor token is not valid hex: {0}")]
    InvalidHex(String),

    #[error("cursor payload failed to encode: {0}")]
    Encode(String),

    #[error("cursor payload failed to decode: {0}")]
    Decode(String),

    #[error("cursor lacks the id field '{0}'")]
    MissingIdField(String),
}

impl From<CursorError> for EngineError {
    fn from(err: CursorError) -> Self {
        Self::new(ErrorClass::BadCursor, ErrorOrigin::Codec, err.to_string())
    }
}

///
/// Cursor
///
/// A record's position: each cursor field mapped to the record's value for
/// it. Opaque on the wire.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cursor(BTreeMap<String, Value>);

impl Cursor {
    /// Capture `record`'s position under the given cursor fields. Fields
    /// the record does not carry read as `Null`.
    pub fn for_record<R: Record>(record: &R, cursor_fields: &[(String, Direction)]) -> Self {
        Self(
            cursor_fields
                .iter()
                .map(|(field, _)| {
                    (
                        field.clone(),
                        record.field(field).unwrap_or(Value::Null),
                    )
                })
                .collect(),
        )
    }

    /// The captured value for one cursor field.
    #[must_use]
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Encode into an opaque lowercase-hex token.
    pub fn encode(&self) -> Result<String, CursorError> {
        let bytes = serde_cbor::to_vec(self).map_err(|err| CursorError::Encode(err.to_string()))?;

        Ok(hex::encode(bytes))
    }

    /// Decode an opaque token. The token may include surrounding
    /// whitespace, which is trimmed.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let token = token.trim();

        if token.is_empty() {
            return Err(CursorError::Empty);
        }

        // two hex chars per payload byte
        if token.len() > MAX_CURSOR_PAYLOAD_BYTES * 2 {
            return Err(CursorError::TooLong {
                bytes: token.len() / 2,
            });
        }

        let bytes = hex::decode(token).map_err(|err| CursorError::InvalidHex(err.to_string()))?;
        serde_cbor::from_slice(&bytes).map_err(|err| CursorError::Decode(err.to_string()))
    }
}

///
/// TESTS
///
