use std::iter::FusedIterator;

use bytes::{BufMut, BytesMut};
use tracing::{debug, trace};

use crate::codec::{Frame, FRAME_OVERHEAD, HEADER_LEN, LENGTH_INDEX, MAX_FRAME_LEN, SENTINEL};

/// Where the assembler is within the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// Discarding bytes until a sentinel arrives.
    AwaitingStart,
    /// Collecting the bytes of a frame.
    AccumulatingFrame,
}

/// Incremental frame reassembly over an arbitrarily chunked byte stream.
///
/// Frames start at a sentinel byte and end once the length declared at
/// index 4 has been reached. A sentinel inside a frame is ordinary data: only
/// the declared length ends a frame. Bytes between frames are dropped.
///
/// The assembler never fails. A corrupt length byte delays completion by at
/// most [`MAX_FRAME_LEN`] bytes; callers that need a time bound use
/// [`reset`](Self::reset).
#[derive(Debug)]
pub struct FrameAssembler {
    state: AssemblerState,
    data: BytesMut,
    target_len: Option<usize>,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self {
            state: AssemblerState::AwaitingStart,
            data: BytesMut::with_capacity(MAX_FRAME_LEN),
            target_len: None,
        }
    }

    /// Feed one chunk of input.
    ///
    /// Frames are assembled lazily as the returned iterator is consumed, in
    /// completion order. Dropping the iterator early still consumes the rest
    /// of `chunk`, so the carried state always reflects every byte fed; frames
    /// completed during the drop are discarded.
    #[must_use = "frames are only yielded by consuming the iterator"]
    pub fn feed<'a>(&'a mut self, chunk: &'a [u8]) -> Feed<'a> {
        Feed {
            assembler: self,
            rest: chunk.iter(),
        }
    }

    /// Advance the state machine by one byte.
    pub fn push(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            AssemblerState::AwaitingStart => {
                if byte == SENTINEL {
                    self.data.clear();
                    self.target_len = None;
                    self.state = AssemblerState::AccumulatingFrame;
                }
                None
            }
            AssemblerState::AccumulatingFrame => {
                self.data.put_u8(byte);

                if self.data.len() == HEADER_LEN {
                    let target = FRAME_OVERHEAD + usize::from(self.data[LENGTH_INDEX]);
                    trace!(target_len = target, "frame length known");
                    self.target_len = Some(target);
                }

                if self.target_len == Some(self.data.len()) {
                    self.state = AssemblerState::AwaitingStart;
                    self.target_len = None;
                    let frame = Frame::from_bytes(self.data.split().freeze());
                    trace!(len = frame.len(), "frame complete");
                    return Some(frame);
                }

                None
            }
        }
    }

    /// Drop any partial frame and wait for the next sentinel.
    ///
    /// Returns the number of buffered bytes that were discarded.
    pub fn reset(&mut self) -> usize {
        let discarded = match self.state {
            AssemblerState::AccumulatingFrame => self.data.len(),
            AssemblerState::AwaitingStart => 0,
        };
        if discarded > 0 {
            debug!(discarded, "discarding partial frame");
        }
        self.data.clear();
        self.target_len = None;
        self.state = AssemblerState::AwaitingStart;
        discarded
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Whether a frame is in progress.
    pub fn is_accumulating(&self) -> bool {
        self.state == AssemblerState::AccumulatingFrame
    }

    /// Bytes buffered for the frame in progress.
    pub fn pending_len(&self) -> usize {
        match self.state {
            AssemblerState::AccumulatingFrame => self.data.len(),
            AssemblerState::AwaitingStart => 0,
        }
    }

    /// Target length of the frame in progress, once its length byte arrived.
    pub fn target_len(&self) -> Option<usize> {
        self.target_len
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`FrameAssembler::feed`].
#[derive(Debug)]
pub struct Feed<'a> {
    assembler: &'a mut FrameAssembler,
    rest: std::slice::Iter<'a, u8>,
}

impl Iterator for Feed<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        for &byte in self.rest.by_ref() {
            if let Some(frame) = self.assembler.push(byte) {
                return Some(frame);
            }
        }
        None
    }
}

impl FusedIterator for Feed<'_> {}

impl Drop for Feed<'_> {
    fn drop(&mut self) {
        for &byte in self.rest.by_ref() {
            if let Some(frame) = self.assembler.push(byte) {
                debug!(len = frame.len(), "frame dropped with unconsumed feed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::codec::{encode_frame, FrameHeader};

    fn wire(source: u8, msg_type: u8, payload: &[u8]) -> Vec<u8> {
        let header = FrameHeader {
            prefix: [0x01, 0x01],
            source,
            msg_type,
        };
        let mut buf = BytesMut::new();
        encode_frame(&header, payload, &mut buf).unwrap();
        buf.to_vec()
    }

    fn collect(assembler: &mut FrameAssembler, chunk: &[u8]) -> Vec<Frame> {
        assembler.feed(chunk).collect()
    }

    #[test]
    fn single_frame_one_chunk() {
        let bytes = wire(3, 0, b"hello");
        let mut assembler = FrameAssembler::new();

        let frames = collect(&mut assembler, &bytes);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), &bytes[1..]);
        assert_eq!(assembler.state(), AssemblerState::AwaitingStart);
    }

    #[test]
    fn frame_split_at_every_boundary() {
        let bytes = wire(3, 0, &[0x10, 0x20, 0x30, 0x40]);
        for split in 0..=bytes.len() {
            let mut assembler = FrameAssembler::new();
            let mut frames = collect(&mut assembler, &bytes[..split]);
            frames.extend(collect(&mut assembler, &bytes[split..]));

            assert_eq!(frames.len(), 1, "split at {split}");
            assert_eq!(frames[0].as_bytes(), &bytes[1..], "split at {split}");
        }
    }

    #[test]
    fn byte_by_byte() {
        let bytes = wire(3, 0, b"slow");
        let mut assembler = FrameAssembler::new();

        let frames: Vec<Frame> = bytes.iter().filter_map(|b| assembler.push(*b)).collect();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), b"slow");
    }

    #[test]
    fn two_frames_in_one_chunk() {
        let first = wire(3, 0, b"one");
        let second = wire(1, 4, b"two!");
        let mut stream = first.clone();
        stream.extend_from_slice(&second);

        let mut assembler = FrameAssembler::new();
        let frames = collect(&mut assembler, &stream);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_bytes(), &first[1..]);
        assert_eq!(frames[1].as_bytes(), &second[1..]);
    }

    #[test]
    fn sentinel_in_payload_is_data() {
        let payload = [SENTINEL, 0x00, SENTINEL, SENTINEL, 0x05];
        let bytes = wire(3, 0, &payload);
        let mut assembler = FrameAssembler::new();

        let frames = collect(&mut assembler, &bytes);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), &payload);
    }

    #[test]
    fn sentinel_as_length_byte() {
        // Length byte 0xAA: a 176-byte frame, not a restart.
        let payload = vec![0x11; usize::from(SENTINEL)];
        let bytes = wire(3, 0, &payload);
        let mut assembler = FrameAssembler::new();

        let frames = collect(&mut assembler, &bytes);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), FRAME_OVERHEAD + usize::from(SENTINEL));
    }

    #[test]
    fn garbage_before_sentinel_is_discarded() {
        let mut stream = vec![0x00, 0x13, 0xFF, 0x42];
        let bytes = wire(3, 0, b"ok");
        stream.extend_from_slice(&bytes);

        let mut assembler = FrameAssembler::new();
        let frames = collect(&mut assembler, &stream);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), &bytes[1..]);
    }

    #[test]
    fn garbage_only_yields_nothing() {
        let mut assembler = FrameAssembler::new();
        assert!(collect(&mut assembler, &[0x00, 0x01, 0x02, 0x03]).is_empty());
        assert_eq!(assembler.state(), AssemblerState::AwaitingStart);
    }

    #[test]
    fn target_len_known_after_five_bytes() {
        let mut assembler = FrameAssembler::new();
        assert!(collect(&mut assembler, &[SENTINEL, 0x01, 0x01, 0x03, 0x00]).is_empty());
        assert_eq!(assembler.target_len(), None);
        assert_eq!(assembler.pending_len(), 4);

        assert!(collect(&mut assembler, &[0x02]).is_empty());
        assert_eq!(assembler.target_len(), Some(8));
        assert!(assembler.is_accumulating());
    }

    #[test]
    fn zero_length_frame_is_six_bytes() {
        let bytes = wire(3, 9, &[]);
        let mut assembler = FrameAssembler::new();

        let frames = collect(&mut assembler, &bytes);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), FRAME_OVERHEAD);
    }

    #[test]
    fn reset_discards_partial_frame() {
        let bytes = wire(3, 0, b"partial");
        let mut assembler = FrameAssembler::new();
        assert!(collect(&mut assembler, &bytes[..7]).is_empty());

        assert_eq!(assembler.reset(), 6);
        assert_eq!(assembler.state(), AssemblerState::AwaitingStart);
        assert_eq!(assembler.pending_len(), 0);

        let frames = collect(&mut assembler, &bytes);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn reset_when_idle_is_noop() {
        let mut assembler = FrameAssembler::new();
        assert_eq!(assembler.reset(), 0);
    }

    #[test]
    fn dropped_feed_still_consumes_chunk() {
        let first = wire(3, 0, b"a");
        let second = wire(3, 0, b"b");
        let third = wire(3, 0, b"c");
        let mut stream = first.clone();
        stream.extend_from_slice(&second);
        stream.extend_from_slice(&third[..4]);

        let mut assembler = FrameAssembler::new();
        {
            let mut feed = assembler.feed(&stream);
            let frame = feed.next().unwrap();
            assert_eq!(frame.payload(), b"a");
        }

        // The second frame was dropped with the iterator, the partial third
        // frame is still buffered.
        assert!(assembler.is_accumulating());
        let frames = collect(&mut assembler, &third[4..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), b"c");
    }

    #[test]
    fn state_persists_across_many_chunks() {
        let bytes = wire(3, 0, &[0u8; 34]);
        let mut assembler = FrameAssembler::new();
        let mut frames = Vec::new();
        for chunk in bytes.chunks(3) {
            frames.extend(collect(&mut assembler, chunk));
        }
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), 40);
    }
}
