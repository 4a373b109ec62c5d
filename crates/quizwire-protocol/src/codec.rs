//! Codec trait and implementations for turning messages into frames.
//!
//! The expected message kind is the type parameter of [`Codec::decode`]:
//! `codec.decode::<Solution>(&frame)` fails unless the frame really is a
//! Solution. Callers never try a frame against several types in turn.

use bytes::{BufMut, BytesMut};
#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use crate::wire::{FieldReader, FieldWriter, WireMessage};
use crate::{DecodeError, MessageKind, ProtocolError};

/// Upper bound on the size of a single frame.
///
/// The largest legitimate frame is a congratulations text; anything near
/// this size is garbage or hostile.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Longest congratulations text, in bytes, that still fits in one binary
/// frame once the kind byte, field key and length prefix are added.
pub const MAX_MESSAGE_LEN: usize = MAX_FRAME_LEN - 8;

/// A codec that can encode messages to frames and decode them back.
///
/// `Send + Sync + 'static` so one codec value can be shared by every
/// connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a message into one frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::FrameTooLarge` if the frame would exceed
    /// [`MAX_FRAME_LEN`], since no peer would accept it.
    fn encode<M: WireMessage>(&self, msg: &M) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes one frame, which must be of kind `M::KIND`.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the frame is malformed,
    /// truncated, carries trailing bytes, or is of a different kind.
    fn decode<M: WireMessage>(&self, data: &[u8]) -> Result<M, ProtocolError>;
}

/// Reads the kind byte of a binary frame without decoding the rest.
///
/// Handy for logging what arrived when a decode fails.
pub fn peek_kind(data: &[u8]) -> Result<MessageKind, DecodeError> {
    let &first = data.first().ok_or(DecodeError::Truncated("kind byte"))?;
    MessageKind::from_byte(first).ok_or(DecodeError::UnknownKind(first))
}

fn within_limit(frame: Vec<u8>) -> Result<Vec<u8>, ProtocolError> {
    if frame.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge {
            len: frame.len(),
            max: MAX_FRAME_LEN,
        });
    }
    Ok(frame)
}

// ---------------------------------------------------------------------------
// BinaryCodec
// ---------------------------------------------------------------------------

/// The game's wire format: a kind byte followed by tagged fields.
///
/// See the crate docs for the byte layout.
///
/// ```rust
/// use quizwire_protocol::{BinaryCodec, Codec, Problem, Solution};
///
/// let codec = BinaryCodec;
/// let frame = codec.encode(&Problem::new(7, 5)).unwrap();
/// assert_eq!(frame, [0x01, 0x08, 0x0e, 0x10, 0x0a]);
///
/// let back: Problem = codec.decode(&frame).unwrap();
/// assert_eq!(back, Problem::new(7, 5));
///
/// // A Problem frame is not a Solution.
/// assert!(codec.decode::<Solution>(&frame).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl Codec for BinaryCodec {
    fn encode<M: WireMessage>(&self, msg: &M) -> Result<Vec<u8>, ProtocolError> {
        let mut buf = BytesMut::with_capacity(16);
        buf.put_u8(M::KIND.as_byte());
        msg.write_fields(&mut FieldWriter::new(&mut buf));
        within_limit(buf.to_vec())
    }

    fn decode<M: WireMessage>(&self, data: &[u8]) -> Result<M, ProtocolError> {
        if data.len() > MAX_FRAME_LEN {
            return Err(DecodeError::FrameTooLarge {
                len: data.len(),
                max: MAX_FRAME_LEN,
            }
            .into());
        }
        let found = peek_kind(data)?;
        if found != M::KIND {
            return Err(DecodeError::KindMismatch {
                expected: M::KIND,
                found,
            }
            .into());
        }
        let mut reader = FieldReader::new(&data[1..]);
        let msg = M::read_fields(&mut reader)?;
        reader.finish()?;
        Ok(msg)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

#[cfg(feature = "json")]
#[derive(Serialize)]
struct TaggedRef<'a, M> {
    kind: MessageKind,
    body: &'a M,
}

#[cfg(feature = "json")]
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Tagged<M> {
    kind: MessageKind,
    body: M,
}

/// A human-readable [`Codec`] for debugging and tooling.
///
/// Frames look like `{"kind":"problem","body":{"a":7,"b":5}}`. The kind
/// tag is checked the same way the binary codec checks its kind byte.
/// Never the default on the game wire.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<M: WireMessage>(&self, msg: &M) -> Result<Vec<u8>, ProtocolError> {
        let tagged = TaggedRef {
            kind: M::KIND,
            body: msg,
        };
        within_limit(serde_json::to_vec(&tagged).map_err(ProtocolError::Encode)?)
    }

    fn decode<M: WireMessage>(&self, data: &[u8]) -> Result<M, ProtocolError> {
        if data.len() > MAX_FRAME_LEN {
            return Err(DecodeError::FrameTooLarge {
                len: data.len(),
                max: MAX_FRAME_LEN,
            }
            .into());
        }
        let tagged: Tagged<M> = serde_json::from_slice(data).map_err(DecodeError::Json)?;
        if tagged.kind != M::KIND {
            return Err(DecodeError::KindMismatch {
                expected: M::KIND,
                found: tagged.kind,
            }
            .into());
        }
        Ok(tagged.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Congratulations, Outcome, Problem, Solution};

    const CONGRATS: &str = "Congratulations! Correct answer!";

    fn assert_round_trip<M>(codec: &impl Codec, msg: M)
    where
        M: WireMessage + PartialEq + std::fmt::Debug,
    {
        let frame = codec.encode(&msg).expect("encode");
        let back: M = codec.decode(&frame).expect("decode");
        assert_eq!(back, msg);
    }

    fn sample_frames() -> Vec<Vec<u8>> {
        let codec = BinaryCodec;
        vec![
            codec.encode(&Problem::new(7, 5)).unwrap(),
            codec.encode(&Solution::new(12)).unwrap(),
            codec.encode(&Congratulations::new(CONGRATS)).unwrap(),
            codec
                .encode(&Outcome::Congratulations(Congratulations::new(CONGRATS)))
                .unwrap(),
            codec.encode(&Outcome::NewProblem(Problem::new(19, 1))).unwrap(),
        ]
    }

    // =====================================================================
    // BinaryCodec
    // =====================================================================

    #[test]
    fn test_binary_round_trip_problem_at_bounds() {
        let codec = BinaryCodec;
        for (a, b) in [(1, 1), (1, 19), (19, 1), (19, 19)] {
            assert_round_trip(&codec, Problem::new(a, b));
        }
    }

    #[test]
    fn test_binary_round_trip_solution_extremes() {
        let codec = BinaryCodec;
        for answer in [0, 2, 38, -1, i32::MAX, i32::MIN] {
            assert_round_trip(&codec, Solution::new(answer));
        }
    }

    #[test]
    fn test_binary_round_trip_congratulations() {
        let codec = BinaryCodec;
        assert_round_trip(&codec, Congratulations::new(CONGRATS));
        assert_round_trip(&codec, Congratulations::new(""));
        assert_round_trip(&codec, Congratulations::new("bravo ✓"));
    }

    #[test]
    fn test_binary_round_trip_outcome_variants() {
        let codec = BinaryCodec;
        assert_round_trip(&codec, Outcome::Congratulations(Congratulations::new(CONGRATS)));
        assert_round_trip(&codec, Outcome::NewProblem(Problem::new(1, 19)));
    }

    #[test]
    fn test_binary_round_trip_long_message_uses_multi_byte_length() {
        let codec = BinaryCodec;
        let long = "x".repeat(300);
        let frame = codec.encode(&Congratulations::new(long.clone())).unwrap();
        // kind + key + 2-byte length + body
        assert_eq!(frame.len(), 1 + 1 + 2 + 300);
        assert_round_trip(&codec, Congratulations::new(long));
    }

    #[test]
    fn test_binary_solution_layout() {
        let frame = BinaryCodec.encode(&Solution::new(12)).unwrap();
        assert_eq!(frame, vec![0x02, 0x08, 0x18]);
    }

    #[test]
    fn test_binary_decode_rejects_truncated_frames() {
        let codec = BinaryCodec;
        for frame in sample_frames() {
            let cut = &frame[..frame.len() - 1];
            let err = match frame[0] {
                0x01 => codec.decode::<Problem>(cut).unwrap_err(),
                0x02 => codec.decode::<Solution>(cut).unwrap_err(),
                0x03 => codec.decode::<Congratulations>(cut).unwrap_err(),
                0x04 => codec.decode::<Outcome>(cut).unwrap_err(),
                other => panic!("unexpected kind {other}"),
            };
            assert!(err.is_decode(), "frame {frame:?} cut to {cut:?}");
        }
    }

    #[test]
    fn test_binary_decode_rejects_empty_buffer() {
        let err = BinaryCodec.decode::<Problem>(&[]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Decode(DecodeError::Truncated("kind byte"))
        ));
    }

    #[test]
    fn test_binary_decode_solution_as_problem_is_kind_mismatch() {
        let frame = BinaryCodec.encode(&Solution::new(12)).unwrap();
        let err = BinaryCodec.decode::<Problem>(&frame).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Decode(DecodeError::KindMismatch {
                expected: MessageKind::Problem,
                found: MessageKind::Solution,
            })
        ));
    }

    #[test]
    fn test_binary_decode_congratulations_as_outcome_is_kind_mismatch() {
        let frame = BinaryCodec.encode(&Congratulations::new(CONGRATS)).unwrap();
        let err = BinaryCodec.decode::<Outcome>(&frame).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Decode(DecodeError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_binary_decode_rejects_unknown_kind() {
        let err = BinaryCodec.decode::<Problem>(&[0x09, 0x08, 0x02]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Decode(DecodeError::UnknownKind(0x09))
        ));
    }

    #[test]
    fn test_binary_decode_rejects_trailing_bytes() {
        let mut frame = BinaryCodec.encode(&Problem::new(3, 4)).unwrap();
        frame.push(0x00);
        let err = BinaryCodec.decode::<Problem>(&frame).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Decode(DecodeError::TrailingBytes(1))
        ));
    }

    #[test]
    fn test_binary_decode_rejects_oversized_frame() {
        let frame = vec![0x03; MAX_FRAME_LEN + 1];
        let err = BinaryCodec.decode::<Congratulations>(&frame).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Decode(DecodeError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn test_binary_decode_solution_with_padded_varint_fails() {
        let err = BinaryCodec.decode::<Solution>(&[0x02, 0x08, 0x80, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Decode(DecodeError::NonMinimalVarint)
        ));
    }

    #[test]
    fn test_binary_encode_rejects_oversized_congratulations() {
        let huge = Outcome::Congratulations(Congratulations::new("x".repeat(70_000)));
        let err = BinaryCodec.encode(&huge).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::FrameTooLarge { max: MAX_FRAME_LEN, .. }
        ));
        assert!(!err.is_decode());
    }

    #[test]
    fn test_binary_encode_longest_message_fits() {
        let longest = Outcome::Congratulations(Congratulations::new("x".repeat(MAX_MESSAGE_LEN)));
        let frame = BinaryCodec.encode(&longest).unwrap();
        assert!(frame.len() <= MAX_FRAME_LEN);

        let back: Outcome = BinaryCodec.decode(&frame).unwrap();
        assert_eq!(back, longest);
    }

    #[test]
    fn test_peek_kind() {
        let frame = BinaryCodec.encode(&Outcome::NewProblem(Problem::new(2, 2))).unwrap();
        assert_eq!(peek_kind(&frame).unwrap(), MessageKind::Outcome);
        assert!(peek_kind(&[]).is_err());
        assert!(peek_kind(&[0x7f]).is_err());
    }

    // =====================================================================
    // JsonCodec
    // =====================================================================

    #[cfg(feature = "json")]
    #[test]
    fn test_json_round_trip_all_kinds() {
        let codec = JsonCodec;
        assert_round_trip(&codec, Problem::new(7, 5));
        assert_round_trip(&codec, Solution::new(-3));
        assert_round_trip(&codec, Congratulations::new(CONGRATS));
        assert_round_trip(&codec, Outcome::NewProblem(Problem::new(1, 19)));
        assert_round_trip(&codec, Outcome::Congratulations(Congratulations::new("ok")));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_frame_is_tagged() {
        let frame = JsonCodec.encode(&Problem::new(7, 5)).unwrap();
        let text = String::from_utf8(frame).unwrap();
        assert_eq!(text, r#"{"kind":"problem","body":{"a":7,"b":5}}"#);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_decode_rejects_kind_mismatch() {
        let frame = JsonCodec.encode(&Solution::new(12)).unwrap();
        let err = JsonCodec.decode::<Problem>(&frame).unwrap_err();
        assert!(err.is_decode());
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_decode_rejects_relabelled_body() {
        // A Solution body under a Problem tag is still rejected as Solution.
        let frame = br#"{"kind":"solution","body":{"answer":12}}"#;
        let ok: Solution = JsonCodec.decode(frame).unwrap();
        assert_eq!(ok.answer, 12);

        let lying = br#"{"kind":"problem","body":{"answer":12}}"#;
        let err = JsonCodec.decode::<Solution>(lying).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Decode(DecodeError::KindMismatch { .. })
        ));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_decode_rejects_truncated_frame() {
        let frame = JsonCodec.encode(&Problem::new(7, 5)).unwrap();
        let err = JsonCodec.decode::<Problem>(&frame[..frame.len() - 1]).unwrap_err();
        assert!(err.is_decode());
    }
}
