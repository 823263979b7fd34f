//! Frame reassembly for the eSmart serial protocol.
//!
//! Every frame on the wire is:
//! - a sentinel byte (`0xAA`)
//! - two prefix bytes, a source byte and a message-type byte
//! - a one-byte payload length `L`
//! - `L` payload bytes and a trailing checksum byte
//!
//! The [`FrameAssembler`] rebuilds frames from arbitrarily chunked input;
//! [`FrameReader`] and (with the `async` feature) `FrameCodec` wrap it for
//! blocking and async streams.

pub mod assembler;
pub mod codec;
pub mod error;
#[cfg(feature = "async")]
pub mod framed;
pub mod message;
pub mod reader;

pub use assembler::{AssemblerState, Feed, FrameAssembler};
pub use codec::{
    encode_frame, Frame, FrameHeader, FRAME_OVERHEAD, HEADER_LEN, LENGTH_INDEX, MAX_FRAME_LEN,
    MAX_PAYLOAD, SENTINEL, SOURCE_INDEX, TYPE_INDEX,
};
pub use error::{FrameError, Result};
#[cfg(feature = "async")]
pub use framed::FrameCodec;
pub use message::{
    Command, LOAD_OFF, LOAD_ON, MSG_TELEMETRY, REQUEST_TELEMETRY, SOURCE_CHARGE_CONTROLLER,
};
pub use reader::FrameReader;
