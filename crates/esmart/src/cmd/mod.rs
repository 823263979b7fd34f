use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use esmart_telemetry::{DecoderConfig, DEFAULT_EXT_TEMP_NAME};
use esmart_transport::{SerialConfig, DEFAULT_BAUD_RATE};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod load;
pub mod monitor;
pub mod ports;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Poll a controller and print telemetry records.
    Monitor(MonitorArgs),
    /// Switch the load output on or off.
    Load(LoadArgs),
    /// Decode telemetry from a raw byte capture.
    Decode(DecodeArgs),
    /// List serial ports.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Monitor(args) => monitor::run(args, format),
        Command::Load(args) => load::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SerialArgs {
    /// Serial device, e.g. /dev/ttyUSB0.
    #[arg(env = "ESMART_PORT")]
    pub port: String,
    /// Line speed in baud.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Per-read timeout (e.g. 100ms, 1s).
    #[arg(long, default_value = "100ms")]
    pub read_timeout: String,
}

impl SerialArgs {
    pub fn to_config(&self) -> CliResult<SerialConfig> {
        Ok(SerialConfig {
            port: self.port.clone(),
            baud_rate: self.baud,
            timeout: parse_duration(&self.read_timeout)?,
        })
    }
}

#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Display name attached to every record.
    #[arg(long, env = "ESMART_NAME", default_value = "")]
    pub name: String,
    /// Label of the external temperature sensor.
    #[arg(long, env = "ESMART_EXT_TEMP_NAME", default_value = DEFAULT_EXT_TEMP_NAME)]
    pub ext_temp_name: String,
    /// Drop telemetry frames whose checksum does not add up.
    #[arg(long)]
    pub verify_checksum: bool,
}

impl DeviceArgs {
    pub fn to_config(&self) -> DecoderConfig {
        DecoderConfig {
            name: self.name.clone(),
            ext_temp_name: self.ext_temp_name.clone(),
            verify_checksum: self.verify_checksum,
        }
    }
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub serial: SerialArgs,
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Time between driver ticks (e.g. 100ms).
    #[arg(long, default_value = "100ms")]
    pub tick: String,
    /// Time between telemetry requests.
    #[arg(long, default_value = "1s")]
    pub poll_interval: String,
    /// Pause between reconnect attempts.
    #[arg(long, default_value = "500ms")]
    pub reconnect_delay: String,
    /// Abandon a partial frame after this much silence.
    #[arg(long, default_value = "2s", conflicts_with = "no_frame_timeout")]
    pub frame_timeout: String,
    /// Keep partial frames until they complete, however long that takes.
    #[arg(long)]
    pub no_frame_timeout: bool,
    /// Give up after this many failed reconnect attempts.
    #[arg(long)]
    pub max_reconnect_attempts: Option<u32>,
    /// Exit after printing N records.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LoadState {
    On,
    Off,
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    #[command(flatten)]
    pub serial: SerialArgs,
    /// Desired load output state.
    pub state: LoadState,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Raw capture file. Reads stdin when neither FILE nor --hex is given.
    #[arg(conflicts_with = "hex")]
    pub file: Option<PathBuf>,
    /// Bytes as hex, e.g. "AA 01 01 03 00 22 ...".
    #[arg(long, value_name = "BYTES")]
    pub hex: Option<String>,
    #[command(flatten)]
    pub device: DeviceArgs,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `500ms`, `2s` or bare seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
