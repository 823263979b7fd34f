use crate::error::Result;

/// A byte-stream link to a charge controller.
///
/// The identifier of the device (e.g. `/dev/ttyUSB0`) belongs to the
/// implementation's configuration, so [`open`](Transport::open) can be called
/// again after [`close`](Transport::close) to re-establish the same link.
///
/// Reads never block for long: an implementation returns `Ok(0)` when no bytes
/// arrived within its own short timeout.
pub trait Transport {
    /// Human-readable identifier of the underlying device.
    fn identifier(&self) -> &str;

    /// Open (or reopen) the link.
    fn open(&mut self) -> Result<()>;

    /// Close the link. Closing an already closed transport is a no-op.
    fn close(&mut self);

    /// Whether the link is currently open.
    fn is_open(&self) -> bool;

    /// Number of received bytes that can be read without waiting.
    fn bytes_waiting(&mut self) -> Result<usize>;

    /// Read up to `buf.len()` bytes; `Ok(0)` means nothing was available.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write the whole buffer and flush it to the device.
    fn write_all(&mut self, data: &[u8]) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn identifier(&self) -> &str {
        (**self).identifier()
    }

    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn bytes_waiting(&mut self) -> Result<usize> {
        (**self).bytes_waiting()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_all(data)
    }
}
