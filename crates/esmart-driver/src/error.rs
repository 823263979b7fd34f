use esmart_frame::Command;
use esmart_transport::TransportError;

/// Errors surfaced by the driver.
///
/// Transport failures during [`tick`](crate::PollDriver::tick) are recovered
/// internally and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The initial open failed.
    #[error("failed to open transport: {0}")]
    Open(#[source] TransportError),

    /// An explicit command could not be written; the link was resynced.
    #[error("failed to send {command}: {source}")]
    CommandFailed {
        command: Command,
        source: TransportError,
    },

    /// Recovery hit the configured attempt limit.
    #[error("transport recovery gave up after {attempts} attempts")]
    RecoveryExhausted { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, DriverError>;
