use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use crate::assembler::FrameAssembler;
use crate::codec::Frame;
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 1024;

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally: callers always get complete frames, in
/// stream order. Useful for replaying raw captures.
pub struct FrameReader<T> {
    inner: T,
    assembler: FrameAssembler,
    ready: VecDeque<Frame>,
}

impl<T: Read> FrameReader<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            assembler: FrameAssembler::new(),
            ready: VecDeque::new(),
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached; a
    /// partial frame at EOF is discarded.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                self.assembler.reset();
                return Err(FrameError::ConnectionClosed);
            }

            self.ready.extend(self.assembler.feed(&chunk[..read]));
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
