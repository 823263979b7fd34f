use serde::Serialize;

/// Operating state reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargeMode {
    Idle,
    /// Constant current (bulk).
    ConstantCurrent,
    /// Constant voltage (absorption).
    ConstantVoltage,
    Float,
    Start,
    Unknown(u16),
}

impl ChargeMode {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => ChargeMode::Idle,
            1 => ChargeMode::ConstantCurrent,
            2 => ChargeMode::ConstantVoltage,
            3 => ChargeMode::Float,
            4 => ChargeMode::Start,
            other => ChargeMode::Unknown(other),
        }
    }

    /// Label as shown on the controller's display.
    pub fn label(self) -> &'static str {
        match self {
            ChargeMode::Idle => "IDLE",
            ChargeMode::ConstantCurrent => "CC",
            ChargeMode::ConstantVoltage => "CV",
            ChargeMode::Float => "FLOAT",
            ChargeMode::Start => "START",
            ChargeMode::Unknown(_) => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ChargeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChargeMode::Unknown(raw) => write!(f, "UNKNOWN({raw})"),
            other => f.write_str(other.label()),
        }
    }
}

/// One decoded telemetry frame.
///
/// Voltages are in volts, currents in amps, powers in watts, temperatures in
/// degrees Celsius, `soc` in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    /// Device display name (configuration).
    pub name: String,
    /// Label of the external temperature sensor (configuration).
    pub ext_temp_name: String,
    /// Raw charge mode; see [`charge_mode`](Self::charge_mode).
    pub chg_mode: u16,
    pub pv_volt: f64,
    pub bat_volt: f64,
    pub chg_cur: f64,
    pub load_volt: f64,
    pub load_cur: f64,
    pub chg_power: u16,
    pub load_power: u16,
    pub ext_temp: u8,
    pub int_temp: i16,
    pub soc: u8,
    pub co2_gram: u16,
}

impl TelemetryRecord {
    pub fn charge_mode(&self) -> ChargeMode {
        ChargeMode::from_raw(self.chg_mode)
    }

    /// Numeric fields as `(name, value)` pairs, in wire order.
    pub fn fields(&self) -> [(&'static str, f64); 12] {
        [
            ("chg_mode", f64::from(self.chg_mode)),
            ("pv_volt", self.pv_volt),
            ("bat_volt", self.bat_volt),
            ("chg_cur", self.chg_cur),
            ("load_volt", self.load_volt),
            ("load_cur", self.load_cur),
            ("chg_power", f64::from(self.chg_power)),
            ("load_power", f64::from(self.load_power)),
            ("ext_temp", f64::from(self.ext_temp)),
            ("int_temp", f64::from(self.int_temp)),
            ("soc", f64::from(self.soc)),
            ("co2_gram", f64::from(self.co2_gram)),
        ]
    }
}
