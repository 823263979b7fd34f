//! Byte offsets of the telemetry frame fields.
//!
//! Offsets index the frame with the sentinel excluded. Multi-byte fields are
//! little-endian unsigned. Bytes 15-16, 26, 28 and 30-32 are reserved and not
//! read.

/// A field's position within the telemetry frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// One unsigned byte at the given offset.
    U8(usize),
    /// Two bytes, little-endian, starting at the given offset.
    U16Le(usize),
}

impl Field {
    /// One past the last byte this field reads.
    pub const fn end(self) -> usize {
        match self {
            Field::U8(offset) => offset + 1,
            Field::U16Le(offset) => offset + 2,
        }
    }

    /// Read the raw value from `bytes`, or `None` if the frame is too short.
    pub fn read(self, bytes: &[u8]) -> Option<u16> {
        match self {
            Field::U8(offset) => bytes.get(offset).map(|b| u16::from(*b)),
            Field::U16Le(offset) => {
                let raw = bytes.get(offset..offset + 2)?;
                Some(u16::from_le_bytes([raw[0], raw[1]]))
            }
        }
    }
}

pub const CHG_MODE: Field = Field::U16Le(7);
pub const PV_VOLT: Field = Field::U16Le(9);
pub const BAT_VOLT: Field = Field::U16Le(11);
pub const CHG_CUR: Field = Field::U16Le(13);
pub const LOAD_VOLT: Field = Field::U16Le(17);
pub const LOAD_CUR: Field = Field::U16Le(19);
pub const CHG_POWER: Field = Field::U16Le(21);
pub const LOAD_POWER: Field = Field::U16Le(23);
pub const EXT_TEMP: Field = Field::U8(25);
pub const INT_TEMP: Field = Field::U8(27);
pub const SOC: Field = Field::U8(29);
pub const CO2_GRAM: Field = Field::U16Le(33);

/// Divisor turning tenths into volts / amps.
pub const DECI: f64 = 10.0;

/// Raw `int_temp` values at or above this encode negative temperatures.
pub const INT_TEMP_NEGATIVE_FROM: u16 = 200;

/// Shortest frame that holds every decoded field.
pub const MIN_TELEMETRY_LEN: usize = CO2_GRAM.end();
