use std::time::Duration;

/// Interval between automatic telemetry requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Maximum bytes taken from the transport per read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 100;

/// Pause between reconnect attempts during recovery.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(500);

/// Silence after which a partial frame is abandoned.
pub const DEFAULT_FRAME_TIMEOUT: Duration = Duration::from_secs(2);

/// Driver loop settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Minimum time between telemetry requests. Default: 1 s.
    pub poll_interval: Duration,
    /// Bytes requested per read while draining. Default: 100.
    pub read_chunk_size: usize,
    /// Bytes requested by the liveness read after a reopen. Default: 100.
    pub probe_read_size: usize,
    /// Wait between failed reconnect attempts. Default: 500 ms.
    pub reconnect_delay: Duration,
    /// Abandon a partial frame after this much silence. `None` waits forever.
    /// Default: 2 s.
    pub frame_timeout: Option<Duration>,
    /// Give up recovery after this many attempts. `None` retries forever.
    /// Default: `None`.
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            probe_read_size: DEFAULT_READ_CHUNK_SIZE,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            frame_timeout: Some(DEFAULT_FRAME_TIMEOUT),
            max_reconnect_attempts: None,
        }
    }
}
