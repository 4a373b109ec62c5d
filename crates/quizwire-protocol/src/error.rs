//! Error types for the protocol layer.
//!
//! A [`DecodeError`] always means the frame must not be trusted: the caller
//! aborts the session instead of guessing or substituting a default.

use crate::MessageKind;

/// Why a frame was rejected.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The buffer ended while reading the named element.
    #[error("truncated frame while reading {0}")]
    Truncated(&'static str),

    /// The leading byte names no known message kind.
    #[error("unknown message kind 0x{0:02x}")]
    UnknownKind(u8),

    /// A well-formed frame of the wrong kind.
    #[error("expected {expected} frame, got {found}")]
    KindMismatch {
        expected: MessageKind,
        found: MessageKind,
    },

    /// A field number other than the one required next: unknown, repeated,
    /// or out of order.
    #[error("expected field {expected}, found field {found}")]
    UnexpectedField { expected: u8, found: u8 },

    /// The frame ended before a required field.
    #[error("{kind} frame is missing field `{field}`")]
    MissingField {
        kind: MessageKind,
        field: &'static str,
    },

    /// The field is encoded with the wrong (or an unknown) wire type.
    #[error("field {field} has wire type {found}")]
    WireType { field: u8, found: u8 },

    /// A varint ran past 5 bytes or overflowed `u32`.
    #[error("varint overflows 32 bits")]
    VarintOverflow,

    /// A varint padded with redundant continuation bytes.
    #[error("varint is not minimally encoded")]
    NonMinimalVarint,

    /// A text field is not valid UTF-8.
    #[error("invalid utf-8 in text field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Bytes left over after the last field of the message.
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    /// The frame is larger than any legitimate message.
    #[error("frame of {len} bytes exceeds limit of {max}")]
    FrameTooLarge { len: usize, max: usize },

    /// An outcome with both variants or none.
    #[error("invalid outcome: {0}")]
    InvalidOutcome(&'static str),

    /// The JSON debugging codec rejected the frame.
    #[cfg(feature = "json")]
    #[error("invalid json frame: {0}")]
    Json(serde_json::Error),
}

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The frame was malformed, truncated, or of the wrong kind.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// The encoded frame is larger than a peer would accept.
    #[error("refusing to send frame of {len} bytes, limit is {max}")]
    FrameTooLarge { len: usize, max: usize },

    /// Serialization failed inside the JSON codec.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),
}

impl ProtocolError {
    /// Returns `true` if this error came from rejecting an incoming frame.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
