//! Poll and resync loop for eSmart charge controllers.
//!
//! [`PollDriver`] owns a [`Transport`](esmart_transport::Transport), a frame
//! assembler and a telemetry decoder. The caller drives it by calling
//! [`PollDriver::tick`] on whatever cadence suits the application:
//!
//! ```no_run
//! use esmart_driver::{DriverConfig, PollDriver};
//! use esmart_telemetry::{LogSink, TelemetryDecoder};
//! use esmart_transport::{SerialConfig, SerialTransport};
//!
//! # fn main() -> Result<(), esmart_driver::DriverError> {
//! let transport = SerialTransport::new(SerialConfig::new("/dev/ttyUSB0"));
//! let mut driver = PollDriver::new(transport, TelemetryDecoder::default(), DriverConfig::default())
//!     .with_sink(LogSink);
//! driver.open()?;
//! loop {
//!     driver.tick()?;
//!     std::thread::sleep(std::time::Duration::from_millis(100));
//! }
//! # }
//! ```
//!
//! Transport failures never escape `tick`: the driver closes the link, resets
//! the assembler and reopens until the controller answers again.

pub mod clock;
pub mod config;
pub mod driver;
pub mod error;

pub use clock::{Clock, SystemClock};
pub use config::{
    DriverConfig, DEFAULT_FRAME_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_READ_CHUNK_SIZE,
    DEFAULT_RECONNECT_DELAY,
};
pub use driver::{DriverStats, PollDriver, TickSummary};
pub use error::{DriverError, Result};
