use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Start-of-frame marker.
pub const SENTINEL: u8 = 0xAA;

/// Index of the source discriminator within a frame (sentinel excluded).
pub const SOURCE_INDEX: usize = 2;

/// Index of the message-type discriminator within a frame.
pub const TYPE_INDEX: usize = 3;

/// Index of the length byte within a frame.
pub const LENGTH_INDEX: usize = 4;

/// Bytes that must be buffered before the frame length is known.
pub const HEADER_LEN: usize = LENGTH_INDEX + 1;

/// Frame length minus the declared payload length: header (5) + checksum (1).
pub const FRAME_OVERHEAD: usize = HEADER_LEN + 1;

/// Largest payload the one-byte length field can declare.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// Largest possible frame (sentinel excluded).
pub const MAX_FRAME_LEN: usize = FRAME_OVERHEAD + MAX_PAYLOAD;

/// One complete frame as delivered by the assembler.
///
/// Holds the bytes that followed the sentinel, so index 0 of a `Frame` is the
/// second byte on the wire. Layout:
///
/// ```text
/// ┌────────────┬────────┬──────┬────────┬──────────────┬──────────┐
/// │ prefix (2) │ source │ type │ len L  │ payload (L)  │ checksum │
/// └────────────┴────────┴──────┴────────┴──────────────┴──────────┘
///   0..2         2        3      4        5..5+L         5+L
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    /// Wrap raw frame bytes (sentinel excluded).
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// The frame bytes, sentinel excluded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the frame and return its bytes.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Number of bytes in the frame (sentinel excluded).
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte at `index`, if present.
    pub fn byte(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Source discriminator.
    pub fn source(&self) -> Option<u8> {
        self.byte(SOURCE_INDEX)
    }

    /// Message-type discriminator.
    pub fn msg_type(&self) -> Option<u8> {
        self.byte(TYPE_INDEX)
    }

    /// Payload length declared by the length byte.
    pub fn declared_len(&self) -> Option<usize> {
        self.byte(LENGTH_INDEX).map(usize::from)
    }

    /// Payload bytes between the header and the trailing checksum.
    pub fn payload(&self) -> &[u8] {
        if self.bytes.len() < FRAME_OVERHEAD {
            return &[];
        }
        &self.bytes[HEADER_LEN..self.bytes.len() - 1]
    }

    /// Whether sentinel + frame bytes sum to zero (mod 256).
    pub fn checksum_ok(&self) -> bool {
        self.bytes
            .iter()
            .fold(SENTINEL, |acc, b| acc.wrapping_add(*b))
            == 0
    }

    /// Bytes this frame occupied on the wire, sentinel included.
    pub fn wire_size(&self) -> usize {
        self.bytes.len() + 1
    }
}

/// Header fields needed to build a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// The two bytes preceding the source discriminator. Opaque to this crate.
    pub prefix: [u8; 2],
    /// Source discriminator.
    pub source: u8,
    /// Message-type discriminator.
    pub msg_type: u8,
}

/// Encode a frame into the wire format, sentinel and checksum included.
///
/// The checksum byte makes the sum of all wire bytes zero (mod 256).
pub fn encode_frame(header: &FrameHeader, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let start = dst.len();
    dst.reserve(1 + FRAME_OVERHEAD + payload.len());
    dst.put_u8(SENTINEL);
    dst.put_slice(&header.prefix);
    dst.put_u8(header.source);
    dst.put_u8(header.msg_type);
    dst.put_u8(payload.len() as u8);
    dst.put_slice(payload);
    let sum = dst[start..].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    dst.put_u8(sum.wrapping_neg());
    Ok(())
}
