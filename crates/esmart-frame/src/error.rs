/// Errors that can occur while encoding frames or reading them from a stream.
///
/// Reassembly itself never fails; malformed input only delays or drops frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit the one-byte length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended; any partial frame was discarded.
    #[error("stream closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
