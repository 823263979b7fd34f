//! `tokio_util::codec` adapter for the frame assembler.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::assembler::FrameAssembler;
use crate::codec::Frame;
use crate::error::FrameError;
use crate::message::Command;

/// Decodes frames from, and encodes outbound commands to, an async stream.
///
/// Every byte handed to [`decode`](Decoder::decode) is consumed; partial
/// frames live in the inner assembler between calls.
#[derive(Debug, Default)]
pub struct FrameCodec {
    assembler: FrameAssembler,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// The assembler carrying state between decode calls.
    pub fn assembler(&self) -> &FrameAssembler {
        &self.assembler
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        let mut consumed = src.len();
        let mut found = None;
        for (index, byte) in src.iter().enumerate() {
            if let Some(frame) = self.assembler.push(*byte) {
                consumed = index + 1;
                found = Some(frame);
                break;
            }
        }
        src.advance(consumed);
        Ok(found)
    }
}

impl Encoder<Command> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), FrameError> {
        dst.extend_from_slice(item.as_bytes());
        Ok(())
    }
}
