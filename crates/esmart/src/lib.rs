//! Client driver for eSmart solar charge controllers.
//!
//! The controller speaks a small framed protocol over a serial line. It only
//! reports telemetry when asked, so a client has to poll it once a second,
//! reassemble the replies from arbitrarily chunked reads and resynchronise
//! whenever the cable or adapter misbehaves.
//!
//! # Crate Structure
//!
//! - [`transport`]: byte-stream link abstraction and the serial implementation
//! - [`frame`]: sentinel + length-byte frame reassembly and outbound messages
//! - [`telemetry`]: telemetry field layout, decoder and record sinks
//! - [`driver`]: the poll and resync loop tying the layers together

/// Re-export transport types.
pub mod transport {
    pub use esmart_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use esmart_frame::*;
}

/// Re-export telemetry types.
pub mod telemetry {
    pub use esmart_telemetry::*;
}

/// Re-export driver types.
pub mod driver {
    pub use esmart_driver::*;
}
