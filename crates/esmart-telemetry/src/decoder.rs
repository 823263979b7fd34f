use esmart_frame::{Frame, MSG_TELEMETRY, SOURCE_CHARGE_CONTROLLER};
use tracing::{debug, trace};

use crate::layout::{self, Field};
use crate::record::TelemetryRecord;

/// Default label of the external temperature sensor.
pub const DEFAULT_EXT_TEMP_NAME: &str = "bat";

/// Decoder settings. Labels are copied verbatim into every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Device display name.
    pub name: String,
    /// External temperature sensor label. Default: `"bat"`.
    pub ext_temp_name: String,
    /// Drop frames whose checksum does not add up. Default: off.
    pub verify_checksum: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            ext_temp_name: DEFAULT_EXT_TEMP_NAME.to_string(),
            verify_checksum: false,
        }
    }
}

/// Turns telemetry frames into [`TelemetryRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct TelemetryDecoder {
    config: DecoderConfig,
}

impl TelemetryDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode `frame` if it is a charge-controller telemetry frame.
    ///
    /// Every other frame yields `None`; that is filtering, not an error.
    pub fn decode(&self, frame: &Frame) -> Option<TelemetryRecord> {
        if frame.source() != Some(SOURCE_CHARGE_CONTROLLER)
            || frame.msg_type() != Some(MSG_TELEMETRY)
        {
            trace!(
                source = ?frame.source(),
                msg_type = ?frame.msg_type(),
                "ignoring frame"
            );
            return None;
        }

        if frame.len() < layout::MIN_TELEMETRY_LEN {
            debug!(
                len = frame.len(),
                min = layout::MIN_TELEMETRY_LEN,
                "telemetry frame too short"
            );
            return None;
        }

        if self.config.verify_checksum && !frame.checksum_ok() {
            debug!(len = frame.len(), "telemetry frame failed checksum");
            return None;
        }

        let bytes = frame.as_bytes();
        let raw = |field: Field| field.read(bytes).unwrap_or_default();
        let deci = |field: Field| f64::from(raw(field)) / layout::DECI;

        Some(TelemetryRecord {
            name: self.config.name.clone(),
            ext_temp_name: self.config.ext_temp_name.clone(),
            chg_mode: raw(layout::CHG_MODE),
            pv_volt: deci(layout::PV_VOLT),
            bat_volt: deci(layout::BAT_VOLT),
            chg_cur: deci(layout::CHG_CUR),
            load_volt: deci(layout::LOAD_VOLT),
            load_cur: deci(layout::LOAD_CUR),
            chg_power: raw(layout::CHG_POWER),
            load_power: raw(layout::LOAD_POWER),
            ext_temp: raw(layout::EXT_TEMP) as u8,
            int_temp: signed_temperature(raw(layout::INT_TEMP)),
            soc: raw(layout::SOC) as u8,
            co2_gram: raw(layout::CO2_GRAM),
        })
    }
}

/// The internal sensor reports below-zero readings as `256 + t`.
fn signed_temperature(raw: u16) -> i16 {
    let value = raw as i16;
    if raw >= layout::INT_TEMP_NEGATIVE_FROM {
        value - 256
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn telemetry_bytes() -> Vec<u8> {
        // Sentinel excluded: prefix, source 3, type 0, L = 34.
        let mut bytes = vec![0u8; 40];
        bytes[..5].copy_from_slice(&[0x01, 0x01, 3, 0, 34]);
        bytes
    }

    fn decoder() -> TelemetryDecoder {
        TelemetryDecoder::new(DecoderConfig {
            name: "shed".to_string(),
            ..DecoderConfig::default()
        })
    }

    #[test]
    fn pv_volt_fixed_point() {
        let mut bytes = telemetry_bytes();
        bytes[9..11].copy_from_slice(&[0x64, 0x00]);

        let record = decoder().decode(&Frame::from_bytes(bytes)).unwrap();
        assert_eq!(record.pv_volt, 10.0);
    }

    #[test]
    fn int_temp_wraps_at_200() {
        let mut bytes = telemetry_bytes();
        bytes[27] = 210;
        let record = decoder().decode(&Frame::from_bytes(bytes.clone())).unwrap();
        assert_eq!(record.int_temp, -46);

        bytes[27] = 150;
        let record = decoder().decode(&Frame::from_bytes(bytes.clone())).unwrap();
        assert_eq!(record.int_temp, 150);

        bytes[27] = 199;
        let record = decoder().decode(&Frame::from_bytes(bytes.clone())).unwrap();
        assert_eq!(record.int_temp, 199);

        bytes[27] = 200;
        let record = decoder().decode(&Frame::from_bytes(bytes)).unwrap();
        assert_eq!(record.int_temp, -56);
    }

    #[test]
    fn other_source_is_ignored() {
        let mut bytes = telemetry_bytes();
        bytes[2] = 1;
        assert!(decoder().decode(&Frame::from_bytes(bytes)).is_none());
    }

    #[test]
    fn other_type_is_ignored() {
        let mut bytes = telemetry_bytes();
        bytes[3] = 1;
        assert!(decoder().decode(&Frame::from_bytes(bytes)).is_none());
    }

    #[test]
    fn short_telemetry_frame_is_dropped() {
        let bytes = telemetry_bytes()[..34].to_vec();
        assert!(decoder().decode(&Frame::from_bytes(bytes)).is_none());
    }

    #[test]
    fn exactly_min_len_decodes() {
        let mut bytes = telemetry_bytes()[..35].to_vec();
        bytes[33..35].copy_from_slice(&[0x10, 0x27]);
        let record = decoder().decode(&Frame::from_bytes(bytes)).unwrap();
        assert_eq!(record.co2_gram, 10_000);
    }

    #[test]
    fn reserved_bytes_do_not_affect_record() {
        let plain = decoder()
            .decode(&Frame::from_bytes(telemetry_bytes()))
            .unwrap();

        let mut bytes = telemetry_bytes();
        for index in [15, 16, 26, 28, 30, 31, 32] {
            bytes[index] = 0xFF;
        }
        let noisy = decoder().decode(&Frame::from_bytes(bytes)).unwrap();

        assert_eq!(plain, noisy);
    }

    #[test]
    fn labels_come_from_config() {
        let record = decoder()
            .decode(&Frame::from_bytes(telemetry_bytes()))
            .unwrap();
        assert_eq!(record.name, "shed");
        assert_eq!(record.ext_temp_name, "bat");
    }

    #[test]
    fn checksum_ignored_by_default() {
        let bytes = telemetry_bytes();
        let frame = Frame::from_bytes(bytes);
        assert!(!frame.checksum_ok());
        assert!(decoder().decode(&frame).is_some());
    }

    #[test]
    fn checksum_verified_when_enabled() {
        let strict = TelemetryDecoder::new(DecoderConfig {
            verify_checksum: true,
            ..DecoderConfig::default()
        });

        let mut bytes = telemetry_bytes();
        assert!(strict.decode(&Frame::from_bytes(bytes.clone())).is_none());

        let sum = bytes.iter().fold(0xAAu8, |acc, b| acc.wrapping_add(*b));
        let last = bytes.len() - 1;
        bytes[last] = bytes[last].wrapping_sub(sum);
        assert!(strict.decode(&Frame::from_bytes(bytes)).is_some());
    }
}
