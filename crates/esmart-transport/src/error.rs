/// Errors that can occur in transport operations.
///
/// The driver treats every variant the same way (a transport failure that
/// triggers recovery); the variants exist for logging and CLI exit codes.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the device.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: std::io::Error,
    },

    /// An I/O error occurred on an open transport.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An operation was attempted on a closed transport.
    #[error("transport is not open")]
    NotOpen,
}

impl TransportError {
    /// Wrap a `serialport` open failure.
    pub(crate) fn open(port: &str, err: serialport::Error) -> Self {
        Self::Open {
            port: port.to_string(),
            source: err.into(),
        }
    }
}

impl From<serialport::Error> for TransportError {
    fn from(err: serialport::Error) -> Self {
        Self::Io(err.into())
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
