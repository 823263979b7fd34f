//! Telemetry decoding for eSmart charge controllers.
//!
//! [`TelemetryDecoder`] accepts complete frames from `esmart-frame`, keeps
//! only charge-controller telemetry frames, and extracts the fields listed in
//! [`layout`] into a [`TelemetryRecord`]. Records are handed to a
//! [`TelemetrySink`].

pub mod decoder;
pub mod layout;
pub mod record;
pub mod sink;

pub use decoder::{DecoderConfig, TelemetryDecoder, DEFAULT_EXT_TEMP_NAME};
pub use record::{ChargeMode, TelemetryRecord};
pub use sink::{LogSink, TelemetrySink};
