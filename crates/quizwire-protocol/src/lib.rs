//! Wire protocol for Quizwire.
//!
//! This crate defines what client and server say to each other:
//!
//! - **Types** ([`Problem`], [`Solution`], [`Congratulations`],
//!   [`Outcome`]): the four message shapes.
//! - **Codec** ([`Codec`] trait, [`BinaryCodec`], [`JsonCodec`]): how
//!   those messages become frames and back.
//! - **Errors** ([`ProtocolError`], [`DecodeError`]): why a frame was
//!   refused.
//!
//! # Binary layout
//!
//! Client and server agree on this out-of-band; it is fixed and has no
//! version field.
//!
//! ```text
//! kind  message          fields (key byte, value)
//! 0x01  Problem          0x08 a:varint   0x10 b:varint
//! 0x02  Solution         0x08 answer:varint
//! 0x03  Congratulations  0x0a len:varint message:utf8
//! 0x04  Outcome          exactly one of
//!                          0x0a len:varint congratulations:utf8
//!                          0x12 len:varint Problem fields (no kind byte)
//! ```
//!
//! Integers are zigzag-encoded LEB128 varints of at most 5 bytes. Every
//! field is present, in that order, once. Truncated frames, unknown kinds,
//! a kind other than the one asked for, unknown or repeated fields and
//! trailing bytes are all decode errors.
//!
//! # Architecture
//!
//! ```text
//! Transport (frames) → Protocol (messages) → Session (quiz state)
//! ```

mod codec;
mod error;
mod types;
mod wire;

pub use codec::{peek_kind, BinaryCodec, Codec, MAX_FRAME_LEN, MAX_MESSAGE_LEN};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{DecodeError, ProtocolError};
pub use types::{Congratulations, MessageKind, Outcome, Problem, Solution};
pub use wire::WireMessage;
