//! Known discriminators and the fixed outbound messages.
//!
//! The controller answers on source 3; message type 0 carries the telemetry
//! block. Outbound messages are sent verbatim.

/// Source discriminator of the charge controller.
pub const SOURCE_CHARGE_CONTROLLER: u8 = 3;

/// Message type of the telemetry frame.
pub const MSG_TELEMETRY: u8 = 0;

/// Telemetry poll request.
pub const REQUEST_TELEMETRY: [u8; 10] = [
    0xAA, 0x01, 0x01, 0x01, 0x00, 0x03, 0x00, 0x00, 0x1E, 0x32,
];

/// Switch the load output off.
pub const LOAD_OFF: [u8; 11] = [
    0xAA, 0x01, 0x01, 0x02, 0x04, 0x04, 0x01, 0x00, 0xFE, 0x13, 0x38,
];

/// Switch the load output on.
pub const LOAD_ON: [u8; 11] = [
    0xAA, 0x01, 0x01, 0x02, 0x04, 0x04, 0x01, 0x00, 0xFD, 0x13, 0x39,
];

/// An outbound message the driver can transmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Ask the controller for a telemetry frame.
    RequestTelemetry,
    /// Turn the load output on.
    LoadOn,
    /// Turn the load output off.
    LoadOff,
}

impl Command {
    /// Exact wire bytes of this message.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Command::RequestTelemetry => &REQUEST_TELEMETRY,
            Command::LoadOn => &LOAD_ON,
            Command::LoadOff => &LOAD_OFF,
        }
    }

    /// Short name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Command::RequestTelemetry => "request-telemetry",
            Command::LoadOn => "load-on",
            Command::LoadOff => "load-off",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
