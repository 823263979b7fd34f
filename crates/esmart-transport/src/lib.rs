//! Byte-stream transport abstraction for eSmart charge controllers.
//!
//! The driver only needs a handful of operations from its link: open, close,
//! a non-blocking "bytes waiting" query, short reads and flushed writes. The
//! [`Transport`] trait captures exactly that, and [`SerialTransport`] provides
//! it over a real serial port.
//!
//! This is the lowest layer of esmart. Everything else builds on top of it.

pub mod error;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use serial::{
    available_ports, PortInfo, SerialConfig, SerialTransport, DEFAULT_BAUD_RATE,
    DEFAULT_READ_TIMEOUT,
};
pub use traits::Transport;
