//! Field-level binary encoding shared by every message.
//!
//! ```text
//! frame  := kind:u8 field*
//! field  := key:u8 value
//! key    := (field_number << 3) | wire_type
//!
//! wire_type 0  varint     zigzag(i32) as LEB128, 1..=5 bytes
//! wire_type 2  len-delim  LEB128 length, then that many bytes
//! ```
//!
//! Every field is written, in ascending field order, exactly once. The
//! reader walks fields in that same order and rejects anything else, so a
//! frame has exactly one valid encoding per value.

use bytes::{Buf, BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Congratulations, DecodeError, MessageKind, Outcome, Problem, Solution};

/// A varint never needs more than 5 bytes for 32 bits.
const MAX_VARINT_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WireType {
    Varint = 0,
    LengthDelimited = 2,
}

fn key(field: u8, wire_type: WireType) -> u8 {
    (field << 3) | wire_type as u8
}

fn zigzag(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

fn unzigzag(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

// ---------------------------------------------------------------------------
// WireMessage
// ---------------------------------------------------------------------------

/// A message that can travel in a frame.
///
/// Implemented for [`Problem`], [`Solution`], [`Congratulations`] and
/// [`Outcome`]. Codecs use [`WireMessage::KIND`] as the expected kind when
/// decoding, so asking for the wrong type is always an error.
pub trait WireMessage: Serialize + DeserializeOwned + Sized {
    /// The kind byte identifying this message.
    const KIND: MessageKind;

    #[doc(hidden)]
    fn write_fields(&self, w: &mut FieldWriter<'_>);

    #[doc(hidden)]
    fn read_fields(r: &mut FieldReader<'_>) -> Result<Self, DecodeError>;
}

impl WireMessage for Problem {
    const KIND: MessageKind = MessageKind::Problem;

    fn write_fields(&self, w: &mut FieldWriter<'_>) {
        w.varint(1, self.a);
        w.varint(2, self.b);
    }

    fn read_fields(r: &mut FieldReader<'_>) -> Result<Self, DecodeError> {
        let a = r.varint(Self::KIND, 1, "a")?;
        let b = r.varint(Self::KIND, 2, "b")?;
        Ok(Self { a, b })
    }
}

impl WireMessage for Solution {
    const KIND: MessageKind = MessageKind::Solution;

    fn write_fields(&self, w: &mut FieldWriter<'_>) {
        w.varint(1, self.answer);
    }

    fn read_fields(r: &mut FieldReader<'_>) -> Result<Self, DecodeError> {
        let answer = r.varint(Self::KIND, 1, "answer")?;
        Ok(Self { answer })
    }
}

impl WireMessage for Congratulations {
    const KIND: MessageKind = MessageKind::Congratulations;

    fn write_fields(&self, w: &mut FieldWriter<'_>) {
        w.bytes(1, self.message.as_bytes());
    }

    fn read_fields(r: &mut FieldReader<'_>) -> Result<Self, DecodeError> {
        let message = r.text(Self::KIND, 1, "message")?;
        Ok(Self { message })
    }
}

impl WireMessage for Outcome {
    const KIND: MessageKind = MessageKind::Outcome;

    fn write_fields(&self, w: &mut FieldWriter<'_>) {
        match self {
            Self::Congratulations(c) => w.bytes(1, c.message.as_bytes()),
            Self::NewProblem(p) => {
                let mut body = BytesMut::with_capacity(2 * (1 + MAX_VARINT_LEN));
                p.write_fields(&mut FieldWriter::new(&mut body));
                w.bytes(2, &body);
            }
        }
    }

    fn read_fields(r: &mut FieldReader<'_>) -> Result<Self, DecodeError> {
        let Some(field) = r.peek_field() else {
            return Err(DecodeError::InvalidOutcome("no variant set"));
        };
        let outcome = match field {
            1 => Self::Congratulations(Congratulations {
                message: r.text(Self::KIND, 1, "congratulations")?,
            }),
            2 => {
                let body = r.bytes(Self::KIND, 2, "new_problem")?;
                let mut inner = FieldReader::new(body);
                let problem = Problem::read_fields(&mut inner)?;
                inner.finish()?;
                Self::NewProblem(problem)
            }
            found => {
                return Err(DecodeError::UnexpectedField { expected: 1, found });
            }
        };
        if matches!(r.peek_field(), Some(1 | 2)) {
            return Err(DecodeError::InvalidOutcome("both variants set"));
        }
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// FieldWriter
// ---------------------------------------------------------------------------

#[doc(hidden)]
pub struct FieldWriter<'a> {
    buf: &'a mut BytesMut,
}

impl<'a> FieldWriter<'a> {
    pub(crate) fn new(buf: &'a mut BytesMut) -> Self {
        Self { buf }
    }

    fn varint(&mut self, field: u8, value: i32) {
        self.buf.put_u8(key(field, WireType::Varint));
        self.raw_varint(zigzag(value));
    }

    fn bytes(&mut self, field: u8, value: &[u8]) {
        self.buf.put_u8(key(field, WireType::LengthDelimited));
        // Oversized lengths saturate; the codec rejects such frames.
        self.raw_varint(u32::try_from(value.len()).unwrap_or(u32::MAX));
        self.buf.put_slice(value);
    }

    fn raw_varint(&mut self, mut n: u32) {
        while n >= 0x80 {
            self.buf.put_u8((n as u8 & 0x7f) | 0x80);
            n >>= 7;
        }
        self.buf.put_u8(n as u8);
    }
}

// ---------------------------------------------------------------------------
// FieldReader
// ---------------------------------------------------------------------------

#[doc(hidden)]
pub struct FieldReader<'a> {
    buf: &'a [u8],
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Field number of the next key, without consuming it.
    fn peek_field(&self) -> Option<u8> {
        self.buf.first().map(|k| k >> 3)
    }

    fn varint(
        &mut self,
        kind: MessageKind,
        field: u8,
        name: &'static str,
    ) -> Result<i32, DecodeError> {
        self.key(kind, field, name, WireType::Varint)?;
        Ok(unzigzag(self.raw_varint()?))
    }

    fn bytes(
        &mut self,
        kind: MessageKind,
        field: u8,
        name: &'static str,
    ) -> Result<&'a [u8], DecodeError> {
        self.key(kind, field, name, WireType::LengthDelimited)?;
        let len = self.raw_varint()? as usize;
        if self.buf.remaining() < len {
            return Err(DecodeError::Truncated("length-delimited body"));
        }
        let (body, rest) = self.buf.split_at(len);
        self.buf = rest;
        Ok(body)
    }

    fn text(
        &mut self,
        kind: MessageKind,
        field: u8,
        name: &'static str,
    ) -> Result<String, DecodeError> {
        let raw = self.bytes(kind, field, name)?;
        Ok(std::str::from_utf8(raw)?.to_owned())
    }

    fn key(
        &mut self,
        kind: MessageKind,
        field: u8,
        name: &'static str,
        wire_type: WireType,
    ) -> Result<(), DecodeError> {
        if !self.buf.has_remaining() {
            return Err(DecodeError::MissingField { kind, field: name });
        }
        let raw = self.buf.get_u8();
        let found = raw >> 3;
        if found != field {
            return Err(DecodeError::UnexpectedField {
                expected: field,
                found,
            });
        }
        if raw & 0x07 != wire_type as u8 {
            return Err(DecodeError::WireType {
                field,
                found: raw & 0x07,
            });
        }
        Ok(())
    }

    fn raw_varint(&mut self) -> Result<u32, DecodeError> {
        let mut value: u32 = 0;
        for i in 0..MAX_VARINT_LEN {
            if !self.buf.has_remaining() {
                return Err(DecodeError::Truncated("varint"));
            }
            let byte = self.buf.get_u8();
            let shift = 7 * i as u32;
            // The fifth byte may only carry the top 4 bits.
            if i == MAX_VARINT_LEN - 1 && byte > 0x0f {
                return Err(DecodeError::VarintOverflow);
            }
            value |= u32::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                // A trailing zero group adds nothing to the value.
                if i > 0 && byte == 0 {
                    return Err(DecodeError::NonMinimalVarint);
                }
                return Ok(value);
            }
        }
        Err(DecodeError::VarintOverflow)
    }

    /// Fails if anything is left after the last field.
    pub(crate) fn finish(self) -> Result<(), DecodeError> {
        match self.buf.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}
